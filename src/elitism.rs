//! # Elitism
//!
//! An [`ElitismStrategy`] names the entities that survive into the next
//! generation unchanged. Elites are chosen by scaled fitness, after scaling
//! ran on a fully evaluated population, and are removed from the working set
//! that selection draws parents from.

use std::fmt::Debug;

use crate::entity::{compare_fitness, Entity, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;

pub trait ElitismStrategy<P: Phenotype>: Debug + Send {
    /// Fraction of the population preserved as elites.
    fn elitist_ratio(&self) -> f64;

    /// Number of elites kept out of `population_size` entities.
    fn elite_count(&self, population_size: usize) -> usize {
        let count = (population_size as f64 * self.elitist_ratio()).round();
        (count.max(0.0) as usize).min(population_size)
    }

    /// Returns the indices of the elites in `entities`, best first.
    fn select_elites(&self, entities: &[Entity<P>], mode: EvaluationMode) -> Result<Vec<usize>>;
}

/// Keeps the `round(size * elitist_ratio)` best entities by scaled fitness.
///
/// # Examples
///
/// ```
/// use gaengine::elitism::{ElitismStrategy, StandardElitism};
///
/// let elitism = StandardElitism::new(0.1).unwrap();
/// assert_eq!(ElitismStrategy::<Dummy>::elite_count(&elitism, 25), 3);
/// assert!(StandardElitism::new(1.2).is_err());
/// # #[derive(Clone, Debug)]
/// # struct Dummy;
/// # impl gaengine::phenotype::Phenotype for Dummy {
/// #     fn crossover(&mut self, _other: &Self) {}
/// #     fn mutate(&mut self, _rng: &mut gaengine::rng::RandomNumberGenerator) {}
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct StandardElitism {
    elitist_ratio: f64,
}

impl StandardElitism {
    /// # Errors
    ///
    /// `Configuration` if `elitist_ratio` is outside `[0, 1]`.
    pub fn new(elitist_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&elitist_ratio) {
            return Err(GeneticError::Configuration(format!(
                "Elitist ratio must be in the range [0, 1], got {}",
                elitist_ratio
            )));
        }
        Ok(Self { elitist_ratio })
    }
}

impl<P: Phenotype> ElitismStrategy<P> for StandardElitism {
    fn elitist_ratio(&self) -> f64 {
        self.elitist_ratio
    }

    fn select_elites(&self, entities: &[Entity<P>], mode: EvaluationMode) -> Result<Vec<usize>> {
        let count = <Self as ElitismStrategy<P>>::elite_count(self, entities.len());
        if count == 0 {
            return Ok(Vec::new());
        }

        let fitness = entities
            .iter()
            .map(|entity| entity.fitness(FitnessBasis::Scaled))
            .collect::<Result<Vec<f64>>>()?;

        let mut indices: Vec<usize> = (0..entities.len()).collect();
        indices.sort_by(|&a, &b| compare_fitness(fitness[b], fitness[a], mode));
        indices.truncate(count);
        Ok(indices)
    }
}
