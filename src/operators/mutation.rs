use std::fmt::Debug;

use crate::entity::Entity;
use crate::error::Result;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;

use super::validate_rate;

/// Randomly alters a single child.
pub trait MutationOperator<P: Phenotype>: Debug + Send {
    /// Probability that a child is mutated.
    fn mutation_rate(&self) -> f64;

    /// Mutates `entity` with probability [`mutation_rate`](Self::mutation_rate)
    /// and returns it.
    fn mutate(&self, entity: Entity<P>, rng: &mut RandomNumberGenerator) -> Result<Entity<P>>;
}

/// Mutation through [`Phenotype::mutate`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct PhenotypeMutation {
    mutation_rate: f64,
}

impl PhenotypeMutation {
    /// # Errors
    ///
    /// `Configuration` if `mutation_rate` is outside `[0, 1]`.
    pub fn new(mutation_rate: f64) -> Result<Self> {
        Ok(Self {
            mutation_rate: validate_rate("Mutation rate", mutation_rate)?,
        })
    }
}

impl<P: Phenotype> MutationOperator<P> for PhenotypeMutation {
    fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    fn mutate(&self, mut entity: Entity<P>, rng: &mut RandomNumberGenerator) -> Result<Entity<P>> {
        if rng.chance(self.mutation_rate) {
            entity.phenotype_mut().mutate(rng);
        }
        Ok(entity)
    }
}
