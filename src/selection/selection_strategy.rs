use std::fmt::Debug;

use crate::entity::{Entity, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;

/// Trait for parent selection operators.
///
/// A selection operator picks one entity at a time from the working set of a
/// population (the entities left after elites were removed). Operators read
/// either raw or scaled fitness, as reported by [`selection_basis`].
///
/// # Examples
///
/// ```
/// use gaengine::entity::Entity;
/// use gaengine::evaluation::EvaluationMode;
/// use gaengine::phenotype::Phenotype;
/// use gaengine::rng::RandomNumberGenerator;
/// use gaengine::selection::{RankSelection, SelectionOperator};
///
/// #[derive(Clone, Debug)]
/// struct MyPhenotype {
///     value: f64,
/// }
///
/// impl Phenotype for MyPhenotype {
///     fn crossover(&mut self, other: &Self) {
///         self.value = (self.value + other.value) / 2.0;
///     }
///
///     fn mutate(&mut self, _rng: &mut RandomNumberGenerator) {
///         self.value += 0.1;
///     }
/// }
///
/// let entities: Vec<Entity<MyPhenotype>> = [0.5, 0.8, 0.3]
///     .iter()
///     .map(|&value| {
///         let mut entity = Entity::new(MyPhenotype { value });
///         entity.set_raw_fitness(value, 0);
///         entity.set_scaled_fitness(value);
///         entity
///     })
///     .collect();
///
/// let mut rng = RandomNumberGenerator::from_seed(1);
/// let selection = RankSelection::new();
/// let parent = selection
///     .select_entity(&entities, EvaluationMode::Maximize, &mut rng)
///     .unwrap();
/// assert!(entities.iter().any(|e| e.representation() == parent.representation()));
/// ```
///
/// [`selection_basis`]: SelectionOperator::selection_basis
pub trait SelectionOperator<P: Phenotype>: Debug + Send {
    /// Which fitness value this operator reads.
    fn selection_basis(&self) -> FitnessBasis {
        FitnessBasis::Scaled
    }

    /// Picks the index of one entity in `entities`.
    ///
    /// # Errors
    ///
    /// `EmptyPopulation` if `entities` is empty, `Precondition` if an entity
    /// lacks the fitness value the operator reads.
    fn select_index(
        &self,
        entities: &[Entity<P>],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;

    /// Picks one entity and returns a clone of it to be used as a parent.
    fn select_entity(
        &self,
        entities: &[Entity<P>],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Entity<P>> {
        let index = self.select_index(entities, mode, rng)?;
        entities.get(index).cloned().ok_or_else(|| {
            GeneticError::Precondition(format!(
                "Selection returned index {} for {} entities",
                index,
                entities.len()
            ))
        })
    }

    /// Called once per generation, right after the new generation was created.
    fn on_generation_created(&mut self, _generation: usize) {}

    /// Called when a fresh run is initialized.
    fn reset(&mut self) {}
}

/// Reads the fitness values an operator works on, rejecting empty input.
pub(crate) fn selection_values<P: Phenotype>(
    entities: &[Entity<P>],
    basis: FitnessBasis,
) -> Result<Vec<f64>> {
    if entities.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }
    entities.iter().map(|entity| entity.fitness(basis)).collect()
}

/// Indices of `values` ordered from worst to best under `mode`.
pub(crate) fn indices_worst_to_best(values: &[f64], mode: EvaluationMode) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| crate::entity::compare_fitness(values[a], values[b], mode));
    indices
}
