use crate::{
    elitism::ElitismStrategy,
    error::{GeneticError, Result},
    evaluation::FitnessEvaluator,
    operators::{CrossoverOperator, MutationOperator},
    phenotype::Phenotype,
    population::EntitySeeder,
    rng::RandomNumberGenerator,
    scaling::{FitnessScalingStrategy, NoScaling},
    selection::SelectionOperator,
    strategy::{GenerationStrategy, Operators, SimpleStrategy},
    termination::Terminator,
};

use super::{observer::AlgorithmObserver, options::AlgorithmOptions, GeneticAlgorithm};

/// Builder for [`GeneticAlgorithm`].
///
/// An evaluator, a selection operator, a crossover operator and a seeder are
/// required. The strategy defaults to [`SimpleStrategy`], scaling to
/// [`NoScaling`]; mutation, elitism and the terminator are optional.
///
/// # Examples
///
/// ```
/// use gaengine::error::Result;
/// use gaengine::evaluation::FitnessEvaluator;
/// use gaengine::evolution::{AlgorithmOptions, GeneticAlgorithmBuilder};
/// use gaengine::operators::{PhenotypeCrossover, PhenotypeMutation};
/// use gaengine::phenotype::Phenotype;
/// use gaengine::rng::RandomNumberGenerator;
/// use gaengine::selection::TournamentSelection;
/// use gaengine::termination::GenerationCountTerminator;
///
/// #[derive(Clone, Debug)]
/// struct Point { x: f64 }
///
/// impl Phenotype for Point {
///     fn crossover(&mut self, other: &Self) { self.x = (self.x + other.x) / 2.0; }
///     fn mutate(&mut self, rng: &mut RandomNumberGenerator) { self.x += rng.gen_range_f64(-1.0, 1.0); }
/// }
///
/// struct Height;
///
/// impl FitnessEvaluator<Point> for Height {
///     fn evaluate_fitness(&self, point: &Point) -> Result<f64> {
///         Ok(-(point.x - 3.0).powi(2))
///     }
/// }
///
/// let mut algorithm = GeneticAlgorithmBuilder::new()
///     .with_options(AlgorithmOptions::new(16, 1))
///     .with_evaluator(Height)
///     .with_selection(TournamentSelection::default())
///     .with_crossover(PhenotypeCrossover::new(0.9).unwrap())
///     .with_mutation(PhenotypeMutation::new(0.2).unwrap())
///     .with_terminator(GenerationCountTerminator::new(10))
///     .with_seeder(|rng: &mut RandomNumberGenerator| Point { x: rng.gen_range_f64(-5.0, 5.0) })
///     .with_seed(1)
///     .build()
///     .unwrap();
///
/// assert_eq!(algorithm.run().unwrap(), 10);
/// ```
pub struct GeneticAlgorithmBuilder<P: Phenotype> {
    options: AlgorithmOptions,
    strategy: Option<Box<dyn GenerationStrategy<P>>>,
    evaluator: Option<Box<dyn FitnessEvaluator<P>>>,
    selection: Option<Box<dyn SelectionOperator<P>>>,
    crossover: Option<Box<dyn CrossoverOperator<P>>>,
    mutation: Option<Box<dyn MutationOperator<P>>>,
    elitism: Option<Box<dyn ElitismStrategy<P>>>,
    scaling: Option<Box<dyn FitnessScalingStrategy<P>>>,
    terminator: Option<Box<dyn Terminator<P>>>,
    seeder: Option<Box<dyn EntitySeeder<P>>>,
    observers: Vec<Box<dyn AlgorithmObserver<P>>>,
    seed: Option<u64>,
}

impl<P: Phenotype> GeneticAlgorithmBuilder<P> {
    pub fn new() -> Self {
        Self {
            options: AlgorithmOptions::default(),
            strategy: None,
            evaluator: None,
            selection: None,
            crossover: None,
            mutation: None,
            elitism: None,
            scaling: None,
            terminator: None,
            seeder: None,
            observers: Vec::new(),
            seed: None,
        }
    }

    pub fn with_options(mut self, options: AlgorithmOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: GenerationStrategy<P> + 'static,
    {
        self.strategy = Some(Box::new(strategy));
        self
    }

    pub fn with_evaluator<E>(mut self, evaluator: E) -> Self
    where
        E: FitnessEvaluator<P> + 'static,
    {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Sets an already boxed evaluator, such as the one returned by
    /// [`CachingEvaluator::with_cache`](crate::evaluation::CachingEvaluator::with_cache).
    pub fn with_boxed_evaluator(mut self, evaluator: Box<dyn FitnessEvaluator<P>>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_selection<S>(mut self, selection: S) -> Self
    where
        S: SelectionOperator<P> + 'static,
    {
        self.selection = Some(Box::new(selection));
        self
    }

    pub fn with_crossover<C>(mut self, crossover: C) -> Self
    where
        C: CrossoverOperator<P> + 'static,
    {
        self.crossover = Some(Box::new(crossover));
        self
    }

    pub fn with_mutation<M>(mut self, mutation: M) -> Self
    where
        M: MutationOperator<P> + 'static,
    {
        self.mutation = Some(Box::new(mutation));
        self
    }

    pub fn with_elitism<E>(mut self, elitism: E) -> Self
    where
        E: ElitismStrategy<P> + 'static,
    {
        self.elitism = Some(Box::new(elitism));
        self
    }

    pub fn with_scaling<S>(mut self, scaling: S) -> Self
    where
        S: FitnessScalingStrategy<P> + 'static,
    {
        self.scaling = Some(Box::new(scaling));
        self
    }

    pub fn with_terminator<T>(mut self, terminator: T) -> Self
    where
        T: Terminator<P> + 'static,
    {
        self.terminator = Some(Box::new(terminator));
        self
    }

    pub fn with_seeder<S>(mut self, seeder: S) -> Self
    where
        S: EntitySeeder<P> + 'static,
    {
        self.seeder = Some(Box::new(seeder));
        self
    }

    /// Adds an observer; observers are notified in the order they were added.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: AlgorithmObserver<P> + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    /// Seeds the random number generator for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<GeneticAlgorithm<P>> {
        let evaluator = self
            .evaluator
            .ok_or_else(|| GeneticError::Configuration("Fitness evaluator not specified".to_string()))?;

        let selection = self.selection.ok_or_else(|| {
            GeneticError::Configuration("Selection operator not specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            GeneticError::Configuration("Crossover operator not specified".to_string())
        })?;

        let seeder = self
            .seeder
            .ok_or_else(|| GeneticError::Configuration("Entity seeder not specified".to_string()))?;

        let operators = Operators {
            evaluator,
            selection,
            crossover,
            mutation: self.mutation,
            elitism: self.elitism,
            scaling: self.scaling.unwrap_or_else(|| Box::new(NoScaling)),
        };

        let rng = match self.seed {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };

        Ok(GeneticAlgorithm::new(
            self.options,
            self.strategy.unwrap_or_else(|| Box::new(SimpleStrategy::new())),
            operators,
            self.terminator,
            seeder,
            self.observers,
            rng,
        ))
    }
}

impl<P: Phenotype> Default for GeneticAlgorithmBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
