//! # Population
//!
//! A [`Population`] is an ordered collection of entities with a configured
//! target size and cached fitness aggregates. Populations are grouped into an
//! [`Environment`], one per deme.

pub mod environment;
pub mod seeder;
pub mod statistics;

pub use environment::Environment;
pub use seeder::{seed_population, EntitySeeder};
pub use statistics::FitnessSummary;

use crate::entity::{compare_fitness, Entity, FitnessBasis};
use crate::error::{GeneticError, OptionExt, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;

/// An ordered, mutable collection of entities plus aggregate statistics.
#[derive(Debug, Clone)]
pub struct Population<P: Phenotype> {
    entities: Vec<Entity<P>>,
    index: usize,
    target_size: usize,
    raw_statistics: Option<FitnessSummary>,
    scaled_statistics: Option<FitnessSummary>,
}

impl<P: Phenotype> Population<P> {
    /// Creates an empty population at position `index` of its environment.
    pub fn new(index: usize, target_size: usize) -> Self {
        Self {
            entities: Vec::with_capacity(target_size),
            index,
            target_size,
            raw_statistics: None,
            scaled_statistics: None,
        }
    }

    /// Creates a population whose target size is the number of given entities.
    pub fn from_entities(index: usize, entities: Vec<Entity<P>>) -> Self {
        let target_size = entities.len();
        Self {
            entities,
            index,
            target_size,
            raw_statistics: None,
            scaled_statistics: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The size the population is restored to at the end of every generation.
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity<P>] {
        &self.entities
    }

    /// Mutable access to the entity list. Cached statistics are dropped since
    /// the caller may change membership or fitness.
    pub fn entities_mut(&mut self) -> &mut Vec<Entity<P>> {
        self.invalidate_statistics();
        &mut self.entities
    }

    pub fn push(&mut self, entity: Entity<P>) {
        self.invalidate_statistics();
        self.entities.push(entity);
    }

    pub fn extend<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = Entity<P>>,
    {
        self.invalidate_statistics();
        self.entities.extend(entities);
    }

    /// Removes and returns all entities, leaving the population empty.
    pub fn take_entities(&mut self) -> Vec<Entity<P>> {
        self.invalidate_statistics();
        std::mem::take(&mut self.entities)
    }

    /// Replaces the population's entities wholesale.
    pub fn replace_entities(&mut self, entities: Vec<Entity<P>>) {
        self.invalidate_statistics();
        self.entities = entities;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<P>> {
        self.entities.iter()
    }

    /// Collects the requested fitness value of every entity.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if any entity lacks the requested value.
    pub fn fitness_values(&self, basis: FitnessBasis) -> Result<Vec<f64>> {
        self.entities.iter().map(|e| e.fitness(basis)).collect()
    }

    /// Sorts the entities best first under `mode`. The sort is stable, so
    /// entities with equal fitness keep their relative order.
    pub fn sort_by_fitness(&mut self, basis: FitnessBasis, mode: EvaluationMode) -> Result<()> {
        sort_best_first(&mut self.entities, basis, mode)
    }

    /// Returns the best entity under `mode`.
    pub fn best(&self, basis: FitnessBasis, mode: EvaluationMode) -> Result<&Entity<P>> {
        let mut best: Option<(&Entity<P>, f64)> = None;
        for entity in &self.entities {
            let value = entity.fitness(basis)?;
            match best {
                Some((_, current)) if compare_fitness(value, current, mode).is_le() => {}
                _ => best = Some((entity, value)),
            }
        }
        best.map(|(entity, _)| entity)
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)
    }

    /// Recomputes the raw fitness aggregates.
    ///
    /// # Errors
    ///
    /// `EmptyPopulation` for an empty population, `Precondition` if an entity
    /// has no raw fitness.
    pub fn refresh_raw_statistics(&mut self) -> Result<&FitnessSummary> {
        let values = self.fitness_values(FitnessBasis::Raw)?;
        let summary = FitnessSummary::from_values(&values)?;
        Ok(&*self.raw_statistics.insert(summary))
    }

    /// Recomputes the scaled fitness aggregates.
    pub fn refresh_scaled_statistics(&mut self) -> Result<&FitnessSummary> {
        let values = self.fitness_values(FitnessBasis::Scaled)?;
        let summary = FitnessSummary::from_values(&values)?;
        Ok(&*self.scaled_statistics.insert(summary))
    }

    pub fn raw_statistics(&self) -> Option<&FitnessSummary> {
        self.raw_statistics.as_ref()
    }

    pub fn scaled_statistics(&self) -> Option<&FitnessSummary> {
        self.scaled_statistics.as_ref()
    }

    fn invalidate_statistics(&mut self) {
        self.raw_statistics = None;
        self.scaled_statistics = None;
    }
}

/// Sorts a slice of entities best first under `mode`.
///
/// # Errors
///
/// Returns `Precondition` if any entity lacks the requested fitness value; the
/// slice is left untouched in that case.
pub fn sort_best_first<P: Phenotype>(
    entities: &mut [Entity<P>],
    basis: FitnessBasis,
    mode: EvaluationMode,
) -> Result<()> {
    for entity in entities.iter() {
        entity.fitness(basis)?;
    }
    entities.sort_by(|a, b| {
        let fa = a.fitness(basis).unwrap_or(f64::NAN);
        let fb = b.fitness(basis).unwrap_or(f64::NAN);
        compare_fitness(fb, fa, mode)
    });
    Ok(())
}
