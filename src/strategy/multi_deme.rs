//! # MultiDemeStrategy
//!
//! Evolves every population with the [`SimpleStrategy`] and, every
//! `migrate_each_generation` generations, moves the best entities around the
//! ring of populations: the best `migrant_count` entities of population 0
//! move to population 1, whose worst entities move on to population 2, and so
//! on; the entities pushed out of the last population close the ring in
//! population 0. Every population keeps its size.
use tracing::{debug, trace};

use super::{GenerationContext, GenerationStrategy, SimpleStrategy};
use crate::{
    entity::{Entity, FitnessBasis},
    error::{GeneticError, Result},
    evaluation::EvaluationMode,
    evolution::options::AlgorithmOptions,
    phenotype::Phenotype,
    population::{Environment, Population},
    rng::RandomNumberGenerator,
};

#[derive(Debug, Clone)]
pub struct MultiDemeStrategy {
    inner: SimpleStrategy,
    migrate_each_generation: usize,
    migrant_count: usize,
}

impl MultiDemeStrategy {
    /// Creates a multi-deme strategy migrating `migrant_count` entities every
    /// `migrate_each_generation` generations.
    ///
    /// # Errors
    ///
    /// `Configuration` if `migrate_each_generation` is zero.
    pub fn new(migrate_each_generation: usize, migrant_count: usize) -> Result<Self> {
        if migrate_each_generation == 0 {
            return Err(GeneticError::Configuration(
                "Migration interval must be at least one generation".to_string(),
            ));
        }

        Ok(Self {
            inner: SimpleStrategy::new(),
            migrate_each_generation,
            migrant_count,
        })
    }

    pub fn migrate_each_generation(&self) -> usize {
        self.migrate_each_generation
    }

    pub fn migrant_count(&self) -> usize {
        self.migrant_count
    }

    /// Whether migration happens after `generation` was evaluated.
    pub fn is_migration_generation(&self, generation: usize) -> bool {
        generation > 0 && generation % self.migrate_each_generation == 0
    }

    /// Moves migrants around the ring of populations, best entities first,
    /// ranked by scaled fitness.
    ///
    /// A no-op with zero migrants or a single population.
    ///
    /// # Errors
    ///
    /// `Precondition` if a population holds fewer entities than migrants, or
    /// if an entity has no scaled fitness. Every population is checked before
    /// any entity moves, so a failed migration leaves the environment intact.
    pub fn migrate<P: Phenotype>(
        &self,
        environment: &mut Environment<P>,
        mode: EvaluationMode,
    ) -> Result<()> {
        let populations = environment.populations_mut();
        if self.migrant_count == 0 || populations.len() < 2 {
            return Ok(());
        }

        for population in populations.iter() {
            self.check_capacity(population)?;
            population.fitness_values(FitnessBasis::Scaled)?;
        }

        let (first, rest) = populations.split_at_mut(1);
        let mut migrants = self.take_best(&mut first[0], mode)?;

        for population in rest.iter_mut() {
            trace!(
                to = population.index(),
                migrants = migrants.len(),
                "migrating entities"
            );
            population.extend(migrants);
            migrants = self.take_worst(population, mode)?;
        }

        first[0].extend(migrants);
        debug!(
            populations = populations.len(),
            migrant_count = self.migrant_count,
            "migration complete"
        );
        Ok(())
    }

    fn take_best<P: Phenotype>(
        &self,
        population: &mut Population<P>,
        mode: EvaluationMode,
    ) -> Result<Vec<Entity<P>>> {
        self.check_capacity(population)?;
        population.sort_by_fitness(FitnessBasis::Scaled, mode)?;
        Ok(population
            .entities_mut()
            .drain(..self.migrant_count)
            .collect())
    }

    fn take_worst<P: Phenotype>(
        &self,
        population: &mut Population<P>,
        mode: EvaluationMode,
    ) -> Result<Vec<Entity<P>>> {
        self.check_capacity(population)?;
        population.sort_by_fitness(FitnessBasis::Scaled, mode)?;
        let keep = population.len() - self.migrant_count;
        Ok(population.entities_mut().split_off(keep))
    }

    fn check_capacity<P: Phenotype>(&self, population: &Population<P>) -> Result<()> {
        if population.len() < self.migrant_count {
            return Err(GeneticError::Precondition(format!(
                "Population {} holds {} entities, cannot emit {} migrants",
                population.index(),
                population.len(),
                self.migrant_count
            )));
        }
        Ok(())
    }
}

impl<P: Phenotype> GenerationStrategy<P> for MultiDemeStrategy {
    fn validate(&self, options: &AlgorithmOptions) -> Result<()> {
        GenerationStrategy::<P>::validate(&self.inner, options)?;

        if self.migrant_count > 0 && self.migrant_count >= options.get_population_size() {
            return Err(GeneticError::Configuration(format!(
                "Migrant count {} must be smaller than the population size {}",
                self.migrant_count,
                options.get_population_size()
            )));
        }
        Ok(())
    }

    fn create_next_generation(
        &self,
        population: &mut Population<P>,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        self.inner.create_next_generation(population, context, rng)
    }

    fn after_fitness_evaluation(
        &self,
        environment: &mut Environment<P>,
        context: &GenerationContext<'_, P>,
    ) -> Result<bool> {
        if !self.is_migration_generation(context.generation)
            || self.migrant_count == 0
            || environment.population_count() < 2
        {
            return Ok(false);
        }

        self.migrate(environment, context.evaluation_mode())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::*;

    fn environment(populations: &[&[f64]]) -> Environment<Point> {
        Environment::new(
            populations
                .iter()
                .enumerate()
                .map(|(index, xs)| evaluated_population(index, xs, 1))
                .collect(),
        )
    }

    fn sorted(mut values: Vec<f64>) -> Vec<f64> {
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    #[test]
    fn test_migration_moves_best_around_the_ring() {
        let strategy = MultiDemeStrategy::new(1, 2).unwrap();
        let mut env = environment(&[
            &[10.0, 11.0, 1.0, 2.0],
            &[20.0, 21.0, 3.0, 4.0],
            &[30.0, 31.0, 5.0, 6.0],
        ]);

        strategy.migrate(&mut env, EvaluationMode::Maximize).unwrap();

        // Population 1 receives 10 and 11 and hands its worst (3, 4) on.
        assert_eq!(
            sorted(scaled_values(&env.populations()[1])),
            vec![10.0, 11.0, 20.0, 21.0]
        );
        // Population 2 receives 3 and 4 and hands 3 and 4 straight on.
        assert_eq!(
            sorted(scaled_values(&env.populations()[2])),
            vec![5.0, 6.0, 30.0, 31.0]
        );
        // Population 0 lost its best two and closes the ring.
        assert_eq!(
            sorted(scaled_values(&env.populations()[0])),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_migration_conserves_sizes() {
        let strategy = MultiDemeStrategy::new(1, 3).unwrap();
        let mut env = environment(&[
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[6.0, 7.0, 8.0, 9.0, 10.0],
            &[11.0, 12.0, 13.0, 14.0, 15.0],
            &[16.0, 17.0, 18.0, 19.0, 20.0],
        ]);
        let before = sorted(
            env.populations()
                .iter()
                .flat_map(|p| scaled_values(p))
                .collect(),
        );

        for _ in 0..3 {
            strategy.migrate(&mut env, EvaluationMode::Minimize).unwrap();
        }

        assert!(env.populations().iter().all(|p| p.len() == 5));
        assert_eq!(env.entity_count(), 20);
        let after = sorted(
            env.populations()
                .iter()
                .flat_map(|p| scaled_values(p))
                .collect(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_degenerate_cases_are_no_ops() {
        let no_migrants = MultiDemeStrategy::new(1, 0).unwrap();
        let mut env = environment(&[&[1.0, 2.0], &[3.0, 4.0]]);
        no_migrants.migrate(&mut env, EvaluationMode::Maximize).unwrap();
        assert_eq!(scaled_values(&env.populations()[0]), vec![1.0, 2.0]);
        assert_eq!(scaled_values(&env.populations()[1]), vec![3.0, 4.0]);

        let single = MultiDemeStrategy::new(1, 1).unwrap();
        let mut env = environment(&[&[1.0, 2.0, 3.0]]);
        single.migrate(&mut env, EvaluationMode::Maximize).unwrap();
        assert_eq!(scaled_values(&env.populations()[0]), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_validation() {
        let options = AlgorithmOptions::new(5, 3);
        assert!(MultiDemeStrategy::new(0, 1).is_err());
        assert!(GenerationStrategy::<Point>::validate(
            &MultiDemeStrategy::new(2, 4).unwrap(),
            &options
        )
        .is_ok());
        assert!(matches!(
            GenerationStrategy::<Point>::validate(&MultiDemeStrategy::new(2, 5).unwrap(), &options),
            Err(GeneticError::Configuration(_))
        ));
        assert!(GenerationStrategy::<Point>::validate(
            &MultiDemeStrategy::new(2, 0).unwrap(),
            &options
        )
        .is_ok());
    }

    #[test]
    fn test_migration_schedule() {
        let strategy = MultiDemeStrategy::new(3, 1).unwrap();
        let operators = operators(None);
        let mut env = environment(&[&[1.0, 2.0], &[3.0, 4.0]]);

        for (generation, expected) in [(1, false), (2, false), (3, true), (6, true)] {
            let context = GenerationContext {
                operators: &operators,
                generation,
                parallel_threshold: 1000,
            };
            assert_eq!(
                strategy.after_fitness_evaluation(&mut env, &context).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_failed_migration_leaves_populations_intact() {
        let strategy = MultiDemeStrategy::new(1, 2).unwrap();

        // The last population has an entity that was never scored.
        let mut env = environment(&[&[10.0, 11.0, 1.0], &[20.0, 21.0, 2.0], &[30.0, 31.0]]);
        env.populations_mut()[2].push(Entity::new(Point { x: 3.0 }));
        assert!(matches!(
            strategy.migrate(&mut env, EvaluationMode::Maximize),
            Err(GeneticError::Precondition(_))
        ));
        assert_eq!(scaled_values(&env.populations()[0]), vec![10.0, 11.0, 1.0]);
        assert_eq!(scaled_values(&env.populations()[1]), vec![20.0, 21.0, 2.0]);
        let last: Vec<f64> = env.populations()[2]
            .iter()
            .map(|e| e.phenotype().x)
            .collect();
        assert_eq!(last, vec![30.0, 31.0, 3.0]);

        // The last population is too small to emit its migrants.
        let mut env = environment(&[&[10.0, 11.0, 1.0], &[20.0, 21.0, 2.0], &[30.0]]);
        assert!(matches!(
            strategy.migrate(&mut env, EvaluationMode::Maximize),
            Err(GeneticError::Precondition(_))
        ));
        assert_eq!(scaled_values(&env.populations()[0]), vec![10.0, 11.0, 1.0]);
        assert_eq!(scaled_values(&env.populations()[1]), vec![20.0, 21.0, 2.0]);
        assert_eq!(scaled_values(&env.populations()[2]), vec![30.0]);
        assert_eq!(env.entity_count(), 7);
    }
}
