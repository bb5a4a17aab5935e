//! # SteadyStateStrategy
//!
//! Replaces only part of a population per generation. Children are bred from
//! the current entities and evaluated right away; afterwards the whole pool
//! (current entities plus children) is ranked by raw fitness and cut back to
//! the target size. Elitism is not consulted: the truncation already keeps
//! the best entities.
use tracing::trace;

use super::{breed, GenerationContext, GenerationStrategy};
use crate::{
    entity::{Entity, FitnessBasis},
    error::{GeneticError, Result},
    evaluation::evaluate_entities,
    evolution::options::AlgorithmOptions,
    phenotype::Phenotype,
    population::{sort_best_first, Population},
    rng::RandomNumberGenerator,
};

/// How many entities are replaced per generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopulationReplacementValue {
    /// A fixed number of entities.
    FixedCount(usize),
    /// A percentage (0 to 100) of the population size, rounded half away from zero.
    Percentage(f64),
}

impl PopulationReplacementValue {
    /// Number of children to add to a population of `population_size` entities.
    ///
    /// ```
    /// use gaengine::strategy::PopulationReplacementValue;
    ///
    /// assert_eq!(PopulationReplacementValue::Percentage(10.0).replacement_count(50), 5);
    /// assert_eq!(PopulationReplacementValue::Percentage(25.0).replacement_count(10), 3);
    /// assert_eq!(PopulationReplacementValue::FixedCount(4).replacement_count(50), 4);
    /// ```
    pub fn replacement_count(&self, population_size: usize) -> usize {
        match *self {
            Self::FixedCount(count) => count,
            Self::Percentage(percentage) => {
                (population_size as f64 * percentage / 100.0).round().max(0.0) as usize
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SteadyStateStrategy {
    replacement: PopulationReplacementValue,
}

impl SteadyStateStrategy {
    pub fn new(replacement: PopulationReplacementValue) -> Self {
        Self { replacement }
    }

    pub fn replacement(&self) -> PopulationReplacementValue {
        self.replacement
    }
}

impl<P: Phenotype> GenerationStrategy<P> for SteadyStateStrategy {
    fn validate(&self, options: &AlgorithmOptions) -> Result<()> {
        match self.replacement {
            PopulationReplacementValue::Percentage(percentage)
                if !(0.0..=100.0).contains(&percentage) =>
            {
                Err(GeneticError::Configuration(format!(
                    "Replacement percentage must be in the range [0, 100], got {}",
                    percentage
                )))
            }
            PopulationReplacementValue::FixedCount(count)
                if count > options.get_population_size() =>
            {
                Err(GeneticError::Configuration(format!(
                    "Replacement count {} exceeds the population size {}",
                    count,
                    options.get_population_size()
                )))
            }
            _ => Ok(()),
        }
    }

    fn create_next_generation(
        &self,
        population: &mut Population<P>,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        let target = population.target_size();
        let replacement_count = self.replacement.replacement_count(target);

        let mut children: Vec<Entity<P>> = Vec::with_capacity(replacement_count);
        while children.len() < replacement_count {
            children.extend(breed(population.entities(), context, rng, usize::MAX)?);
        }

        evaluate_entities(
            &mut children,
            context.operators.evaluator.as_ref(),
            context.generation,
            context.parallel_threshold,
        )?;

        trace!(
            population = population.index(),
            replacement_count,
            children = children.len(),
            "steady-state replacement"
        );

        // Every original needs a raw score before the population is taken apart.
        population.fitness_values(FitnessBasis::Raw)?;
        let mut pool = population.take_entities();
        pool.iter_mut().for_each(Entity::increment_age);
        pool.extend(children);
        sort_best_first(&mut pool, FitnessBasis::Raw, context.evaluation_mode())?;
        pool.truncate(target);

        population.replace_entities(pool);
        Ok(())
    }
}
