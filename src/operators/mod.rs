//! # Variation Operators
//!
//! Crossover and mutation operate on [`Entity`](crate::entity::Entity) values.
//! The adapters [`PhenotypeCrossover`] and [`PhenotypeMutation`] forward to the
//! hooks of the [`Phenotype`](crate::phenotype::Phenotype) trait; custom
//! operators can implement the traits directly.

pub mod crossover;
pub mod mutation;

pub use crossover::{CrossoverOperator, PhenotypeCrossover};
pub use mutation::{MutationOperator, PhenotypeMutation};

use crate::error::{GeneticError, Result};

/// Checks that an operator rate is a probability.
pub(crate) fn validate_rate(name: &str, rate: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(GeneticError::Configuration(format!(
            "{} must be in the range [0, 1], got {}",
            name, rate
        )));
    }
    Ok(rate)
}
