//! # SimpleStrategy
//!
//! Full generational replacement. The elites of the current population (if an
//! elitism strategy is configured) survive unchanged; every other slot of the
//! next generation is filled with children bred from the remaining entities.
//!
//! A failed generation leaves the population as it was.
use tracing::trace;

use super::{breed, GenerationContext, GenerationStrategy};
use crate::{
    entity::Entity, error::Result, phenotype::Phenotype, population::Population,
    rng::RandomNumberGenerator,
};

#[derive(Debug, Clone, Default)]
pub struct SimpleStrategy;

impl SimpleStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Flags the elites of `entities`. All `false` without an elitism strategy.
    fn elite_mask<P: Phenotype>(
        entities: &[Entity<P>],
        context: &GenerationContext<'_, P>,
    ) -> Result<Vec<bool>> {
        let mut is_elite = vec![false; entities.len()];
        if let Some(elitism) = &context.operators.elitism {
            for index in elitism.select_elites(entities, context.evaluation_mode())? {
                is_elite[index] = true;
            }
        }
        Ok(is_elite)
    }

    /// Splits `entities` into elites and the working set along `is_elite`.
    fn split<P: Phenotype>(
        entities: Vec<Entity<P>>,
        is_elite: &[bool],
    ) -> (Vec<Entity<P>>, Vec<Entity<P>>) {
        let (elites, working): (Vec<_>, Vec<_>) = entities
            .into_iter()
            .zip(is_elite.iter().copied())
            .partition(|(_, elite)| *elite);
        (
            elites.into_iter().map(|(entity, _)| entity).collect(),
            working.into_iter().map(|(entity, _)| entity).collect(),
        )
    }

    /// Inverse of [`split`](Self::split): puts the entities back in their
    /// original order.
    fn merge<P: Phenotype>(
        elites: Vec<Entity<P>>,
        working: Vec<Entity<P>>,
        is_elite: &[bool],
    ) -> Vec<Entity<P>> {
        let mut elites = elites.into_iter();
        let mut working = working.into_iter();
        is_elite
            .iter()
            .filter_map(|&elite| if elite { elites.next() } else { working.next() })
            .collect()
    }

    fn breed_children<P: Phenotype>(
        working: &[Entity<P>],
        needed: usize,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Entity<P>>> {
        let mut buffer = Vec::with_capacity(needed);
        while buffer.len() < needed {
            let children = breed(working, context, rng, needed - buffer.len())?;
            buffer.extend(children);
        }
        Ok(buffer)
    }
}

impl<P: Phenotype> GenerationStrategy<P> for SimpleStrategy {
    fn create_next_generation(
        &self,
        population: &mut Population<P>,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        let target = population.target_size();
        let is_elite = Self::elite_mask(population.entities(), context)?;
        let (mut next, working) = Self::split(population.take_entities(), &is_elite);
        let needed = target.saturating_sub(next.len());

        trace!(
            population = population.index(),
            elites = next.len(),
            needed,
            "creating next generation"
        );

        match Self::breed_children(&working, needed, context, rng) {
            Ok(children) => {
                next.iter_mut().for_each(Entity::increment_age);
                next.extend(children);
                population.replace_entities(next);
                Ok(())
            }
            Err(error) => {
                population.replace_entities(Self::merge(next, working, &is_elite));
                Err(error)
            }
        }
    }
}
