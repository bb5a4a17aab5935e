//! # GeneticAlgorithm
//!
//! The generation engine. A `GeneticAlgorithm` owns its configuration, its
//! operators, its random number generator and the environment being evolved.
//! [`GeneticAlgorithm::initialize`] seeds and evaluates generation 0;
//! every call to [`GeneticAlgorithm::step_generation`] then performs one full
//! generation:
//!
//! 1. the generation strategy creates the next populations,
//! 2. every new entity is evaluated (a strict barrier across all populations),
//! 3. the scaling strategy computes scaled fitness and statistics are refreshed,
//! 4. the strategy may post-process the environment (multi-deme migration),
//! 5. observers and the terminator decide whether the run is complete.
//!
//! Use the [`GeneticAlgorithmBuilder`](super::GeneticAlgorithmBuilder) to
//! create one, and an [`ExecutionController`](super::ExecutionController) to
//! drive it interactively.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::observer::{AlgorithmObserver, RunControl};
use super::options::AlgorithmOptions;
use crate::{
    entity::{Entity, FitnessBasis},
    error::{GeneticError, OptionExt, Result},
    evaluation::{evaluate_entities, EvaluationMode},
    phenotype::Phenotype,
    population::{seed_population, EntitySeeder, Environment},
    rng::RandomNumberGenerator,
    strategy::{GenerationContext, GenerationStrategy, Operators},
    termination::{TerminationContext, Terminator},
};

pub struct GeneticAlgorithm<P: Phenotype> {
    options: AlgorithmOptions,
    strategy: Box<dyn GenerationStrategy<P>>,
    operators: Operators<P>,
    terminator: Option<Box<dyn Terminator<P>>>,
    seeder: Box<dyn EntitySeeder<P>>,
    observers: Vec<Box<dyn AlgorithmObserver<P>>>,
    rng: RandomNumberGenerator,
    environment: Environment<P>,
    generation: usize,
    started_at: Option<Instant>,
    initialized: bool,
    initializations: usize,
}

impl<P: Phenotype> GeneticAlgorithm<P> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        options: AlgorithmOptions,
        strategy: Box<dyn GenerationStrategy<P>>,
        operators: Operators<P>,
        terminator: Option<Box<dyn Terminator<P>>>,
        seeder: Box<dyn EntitySeeder<P>>,
        observers: Vec<Box<dyn AlgorithmObserver<P>>>,
        rng: RandomNumberGenerator,
    ) -> Self {
        Self {
            options,
            strategy,
            operators,
            terminator,
            seeder,
            observers,
            rng,
            environment: Environment::empty(),
            generation: 0,
            started_at: None,
            initialized: false,
            initializations: 0,
        }
    }

    /// Prepares a fresh run: validates the configuration, seeds every
    /// population and evaluates generation 0.
    ///
    /// On failure the previous environment is left untouched.
    ///
    /// # Errors
    ///
    /// `Configuration` for invalid options or strategy parameters; any error
    /// raised by the seeder, the evaluator or the scaling strategy.
    pub fn initialize(&mut self) -> Result<()> {
        self.options.validate()?;
        self.strategy.validate(&self.options)?;

        let size = self.options.get_population_size();
        let populations = (0..self.options.get_population_count())
            .map(|index| seed_population(self.seeder.as_mut(), index, size, &mut self.rng))
            .collect::<Result<Vec<_>>>()?;

        let mut environment = Environment::new(populations);
        evaluate_environment(
            &self.operators,
            &mut environment,
            0,
            self.options.get_parallel_threshold(),
        )?;
        scale_environment(&self.operators, &mut environment)?;

        self.environment = environment;
        self.generation = 0;
        self.started_at = Some(Instant::now());
        self.initialized = true;
        self.initializations += 1;
        self.operators.selection.reset();

        info!(
            populations = self.environment.population_count(),
            population_size = size,
            "algorithm initialized"
        );
        for observer in self.observers.iter_mut() {
            observer.algorithm_starting(&self.environment);
        }
        Ok(())
    }

    /// Creates, evaluates and scales the next generation.
    ///
    /// Returns `true` when the run is complete, either because the terminator
    /// says so or because an observer asked to terminate.
    ///
    /// # Errors
    ///
    /// `Precondition` if the algorithm was never initialized; `Evolution` if
    /// the strategy failed to restore a population's size; any operator error.
    /// After a failure the algorithm counts as uninitialized until the next
    /// [`initialize`](Self::initialize).
    pub fn step_generation(&mut self) -> Result<bool> {
        if !self.initialized {
            return Err(GeneticError::Precondition(
                "The algorithm must be initialized before stepping".to_string(),
            ));
        }

        let outcome = self.advance_generation();
        if let Err(error) = &outcome {
            warn!(generation = self.generation + 1, %error, "generation failed");
            self.initialized = false;
        }
        outcome
    }

    fn advance_generation(&mut self) -> Result<bool> {
        let next_generation = self.generation + 1;
        let parallel_threshold = self.options.get_parallel_threshold();
        {
            let context = GenerationContext {
                operators: &self.operators,
                generation: next_generation,
                parallel_threshold,
            };
            self.strategy
                .create_next_environment(&mut self.environment, &context, &mut self.rng)?;
        }
        self.check_population_sizes(next_generation)?;

        self.generation = next_generation;
        self.operators.selection.on_generation_created(next_generation);
        for observer in self.observers.iter_mut() {
            observer.generation_created(&self.environment, next_generation);
        }

        evaluate_environment(
            &self.operators,
            &mut self.environment,
            next_generation,
            parallel_threshold,
        )?;
        scale_environment(&self.operators, &mut self.environment)?;

        let changed = {
            let context = GenerationContext {
                operators: &self.operators,
                generation: next_generation,
                parallel_threshold,
            };
            self.strategy
                .after_fitness_evaluation(&mut self.environment, &context)?
        };
        if changed {
            scale_environment(&self.operators, &mut self.environment)?;
            self.check_population_sizes(next_generation)?;
        }

        let mode = self.evaluation_mode();
        debug!(
            generation = next_generation,
            best_fitness = self.environment.best_fitness(mode).ok(),
            "generation evaluated"
        );

        let mut completed = false;
        for observer in self.observers.iter_mut() {
            if observer.fitness_evaluated(&self.environment, next_generation) == RunControl::Terminate {
                completed = true;
            }
        }

        if let Some(terminator) = &self.terminator {
            let context = TerminationContext {
                generation: next_generation,
                elapsed: self.elapsed(),
                environment: &self.environment,
                evaluation_mode: mode,
            };
            completed |= terminator.is_complete(&context);
        }

        if completed {
            info!(generation = next_generation, "algorithm completed");
            for observer in self.observers.iter_mut() {
                observer.algorithm_completed(&self.environment, next_generation);
            }
        }

        Ok(completed)
    }

    /// Initializes a fresh run and steps until it completes.
    ///
    /// Returns the index of the last generation.
    ///
    /// # Errors
    ///
    /// `Configuration` if no terminator is configured, since such a run would
    /// never return; otherwise any error of `initialize` or `step_generation`.
    pub fn run(&mut self) -> Result<usize> {
        if self.terminator.is_none() {
            return Err(GeneticError::Configuration(
                "A terminator is required to run to completion".to_string(),
            ));
        }

        self.initialize()?;
        while !self.step_generation()? {}
        Ok(self.generation)
    }

    fn check_population_sizes(&self, generation: usize) -> Result<()> {
        for population in self.environment.populations() {
            if population.len() != population.target_size() {
                return Err(GeneticError::Evolution(format!(
                    "Population {} holds {} entities after generation {}, expected {}",
                    population.index(),
                    population.len(),
                    generation,
                    population.target_size()
                )));
            }
        }
        Ok(())
    }

    pub fn environment(&self) -> &Environment<P> {
        &self.environment
    }

    /// Index of the current generation; 0 right after initialization.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of times a fresh run was initialized.
    pub fn initializations(&self) -> usize {
        self.initializations
    }

    pub fn options(&self) -> &AlgorithmOptions {
        &self.options
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.operators.evaluation_mode()
    }

    /// Wall time since the current run was initialized.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    /// The entity with the best raw fitness across all populations.
    pub fn best_entity(&self) -> Result<&Entity<P>> {
        let mode = self.evaluation_mode();
        let mut best: Option<&Entity<P>> = None;
        for population in self.environment.populations() {
            let candidate = population.best(FitnessBasis::Raw, mode)?;
            best = match best {
                Some(current) if current.compare_to(candidate, FitnessBasis::Raw, mode)?.is_ge() => {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best.ok_or_else_genetic(|| GeneticError::EmptyPopulation)
    }
}

impl<P: Phenotype> fmt::Debug for GeneticAlgorithm<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticAlgorithm")
            .field("options", &self.options)
            .field("strategy", &self.strategy)
            .field("operators", &self.operators)
            .field("terminator", &self.terminator)
            .field("generation", &self.generation)
            .field("initialized", &self.initialized)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Evaluates every population that has entities pending for `generation`.
fn evaluate_environment<P: Phenotype>(
    operators: &Operators<P>,
    environment: &mut Environment<P>,
    generation: usize,
    parallel_threshold: usize,
) -> Result<()> {
    for population in environment.populations_mut() {
        evaluate_entities(
            population.entities_mut(),
            operators.evaluator.as_ref(),
            generation,
            parallel_threshold,
        )?;
    }
    Ok(())
}

/// Recomputes scaled fitness and both statistics of every population.
fn scale_environment<P: Phenotype>(
    operators: &Operators<P>,
    environment: &mut Environment<P>,
) -> Result<()> {
    let mode = operators.evaluation_mode();
    for population in environment.populations_mut() {
        population.refresh_raw_statistics()?;
        operators.scaling.update_scaled_fitness(population, mode)?;
        population.refresh_raw_statistics()?;
        population.refresh_scaled_statistics()?;
    }
    Ok(())
}
