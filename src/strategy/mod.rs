//! # GenerationStrategy
//!
//! A `GenerationStrategy` turns the evaluated populations of one generation
//! into the populations of the next. Every strategy restores each population
//! to its target size, so the size of a population (and of the environment)
//! is the same at the end of every generation.
//!
//! - [`SimpleStrategy`]: full replacement, elites carried over unchanged.
//! - [`SteadyStateStrategy`]: a fixed share of the population is replaced by
//!   children each generation; the fittest entities survive.
//! - [`MultiDemeStrategy`]: simple replacement in every population, plus a
//!   periodic migration of the best entities around a ring of populations.

pub mod multi_deme;
pub mod simple;
pub mod steady_state;

use std::fmt::{self, Debug};

use crate::{
    elitism::ElitismStrategy,
    entity::Entity,
    error::{GeneticError, Result},
    evaluation::{EvaluationMode, FitnessEvaluator},
    evolution::options::AlgorithmOptions,
    operators::{CrossoverOperator, MutationOperator},
    phenotype::Phenotype,
    population::{Environment, Population},
    rng::RandomNumberGenerator,
    scaling::FitnessScalingStrategy,
    selection::SelectionOperator,
};

pub use multi_deme::MultiDemeStrategy;
pub use simple::SimpleStrategy;
pub use steady_state::{PopulationReplacementValue, SteadyStateStrategy};

/// The operator set of an algorithm.
pub struct Operators<P: Phenotype> {
    pub evaluator: Box<dyn FitnessEvaluator<P>>,
    pub selection: Box<dyn SelectionOperator<P>>,
    pub crossover: Box<dyn CrossoverOperator<P>>,
    pub mutation: Option<Box<dyn MutationOperator<P>>>,
    pub elitism: Option<Box<dyn ElitismStrategy<P>>>,
    pub scaling: Box<dyn FitnessScalingStrategy<P>>,
}

impl<P: Phenotype> Operators<P> {
    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.evaluator.evaluation_mode()
    }
}

impl<P: Phenotype> Debug for Operators<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operators")
            .field("evaluation_mode", &self.evaluation_mode())
            .field("selection", &self.selection)
            .field("crossover", &self.crossover)
            .field("mutation", &self.mutation)
            .field("elitism", &self.elitism)
            .field("scaling", &self.scaling)
            .finish_non_exhaustive()
    }
}

/// Everything a strategy needs while creating generation `generation`.
#[derive(Debug)]
pub struct GenerationContext<'a, P: Phenotype> {
    pub operators: &'a Operators<P>,
    /// Index of the generation being created.
    pub generation: usize,
    pub parallel_threshold: usize,
}

impl<P: Phenotype> GenerationContext<'_, P> {
    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.operators.evaluation_mode()
    }
}

pub trait GenerationStrategy<P: Phenotype>: Debug + Send {
    /// Rejects configurations the strategy cannot run with.
    fn validate(&self, _options: &AlgorithmOptions) -> Result<()> {
        Ok(())
    }

    /// Replaces the entities of one population with the next generation.
    ///
    /// The population is fully evaluated and scaled on entry, and holds
    /// exactly `target_size` entities on success.
    fn create_next_generation(
        &self,
        population: &mut Population<P>,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()>;

    /// Creates the next generation of every population, in order.
    fn create_next_environment(
        &self,
        environment: &mut Environment<P>,
        context: &GenerationContext<'_, P>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for population in environment.populations_mut() {
            self.create_next_generation(population, context, rng)?;
        }
        Ok(())
    }

    /// Runs after the new generation was evaluated and scaled.
    ///
    /// Returns whether the environment was changed, in which case the
    /// algorithm scales the populations again.
    fn after_fitness_evaluation(
        &self,
        _environment: &mut Environment<P>,
        _context: &GenerationContext<'_, P>,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Selects one parent group from `pool`, recombines it and mutates the
/// children. At most `limit` children are kept; surplus children are dropped
/// before mutation.
///
/// # Errors
///
/// `Operator` if the crossover yields no children.
pub(crate) fn breed<P: Phenotype>(
    pool: &[Entity<P>],
    context: &GenerationContext<'_, P>,
    rng: &mut RandomNumberGenerator,
    limit: usize,
) -> Result<Vec<Entity<P>>> {
    let operators = context.operators;
    let mode = context.evaluation_mode();

    let parents = (0..operators.crossover.parent_count())
        .map(|_| operators.selection.select_entity(pool, mode, rng))
        .collect::<Result<Vec<_>>>()?;

    let mut children = operators.crossover.generate_offspring(&parents, rng)?;
    if children.is_empty() {
        return Err(GeneticError::Operator(
            "Crossover produced no children".to_string(),
        ));
    }
    children.truncate(limit);

    match &operators.mutation {
        Some(mutation) => children
            .into_iter()
            .map(|child| mutation.mutate(child, rng))
            .collect(),
        None => Ok(children),
    }
}
