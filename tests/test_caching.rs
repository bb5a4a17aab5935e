use gaengine::{
    elitism::StandardElitism,
    error::Result,
    evaluation::{CacheKey, CacheType, CachingEvaluator, EvaluationMode, FitnessEvaluator},
    evolution::{AlgorithmOptions, GeneticAlgorithmBuilder},
    operators::PhenotypeCrossover,
    phenotype::Phenotype,
    rng::RandomNumberGenerator,
    selection::TournamentSelection,
    strategy::{PopulationReplacementValue, SteadyStateStrategy},
    termination::GenerationCountTerminator,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

// Define a simple phenotype that can be used for testing
#[derive(Clone, Debug, PartialEq)]
struct TestPhenotype {
    value: i32,
}

impl Phenotype for TestPhenotype {
    fn crossover(&mut self, other: &Self) {
        self.value = (self.value + other.value) / 2;
    }

    fn mutate(&mut self, _rng: &mut RandomNumberGenerator) {
        self.value += 1;
    }
}

impl CacheKey for TestPhenotype {
    type Key = i32;

    fn cache_key(&self) -> Self::Key {
        self.value
    }
}

// An evaluator that counts how often it actually runs
#[derive(Clone, Debug)]
struct CostlyEvaluator {
    evaluations: Arc<AtomicUsize>,
}

impl CostlyEvaluator {
    fn new() -> Self {
        Self {
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn get_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl FitnessEvaluator<TestPhenotype> for CostlyEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Minimize
    }

    fn evaluate_fitness(&self, phenotype: &TestPhenotype) -> Result<f64> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        Ok(phenotype.value.abs() as f64)
    }
}

#[test]
fn test_direct_caching() {
    let evaluator = CostlyEvaluator::new();
    let cached = evaluator.clone().with_global_cache();

    let phenotype = TestPhenotype { value: 42 };
    assert_eq!(cached.evaluate_fitness(&phenotype).unwrap(), 42.0);
    assert_eq!(evaluator.get_evaluations(), 1);

    // Second evaluation should use cache
    assert_eq!(cached.evaluate_fitness(&phenotype).unwrap(), 42.0);
    assert_eq!(evaluator.get_evaluations(), 1);

    assert_eq!(
        cached.evaluate_fitness(&TestPhenotype { value: -43 }).unwrap(),
        43.0
    );
    assert_eq!(evaluator.get_evaluations(), 2);
    assert_eq!(cached.cache_size(), 2);
}

#[test]
fn test_thread_local_caching() {
    let evaluator = CostlyEvaluator::new();
    let cached = Arc::new(evaluator.clone().with_thread_local_cache());
    let phenotype = TestPhenotype { value: 42 };

    cached.evaluate_fitness(&phenotype).unwrap();
    cached.evaluate_fitness(&phenotype).unwrap();
    assert_eq!(evaluator.get_evaluations(), 1);

    let shared = Arc::clone(&cached);
    let thread_phenotype = phenotype.clone();
    std::thread::spawn(move || {
        assert_eq!(shared.evaluate_fitness(&thread_phenotype).unwrap(), 42.0);
    })
    .join()
    .unwrap();

    // The other thread had its own cache
    assert_eq!(evaluator.get_evaluations(), 2);
}

fn run_steady_state(evaluator: Box<dyn FitnessEvaluator<TestPhenotype>>) {
    let mut algorithm = GeneticAlgorithmBuilder::new()
        .with_options(AlgorithmOptions::new(20, 1))
        .with_strategy(SteadyStateStrategy::new(PopulationReplacementValue::Percentage(
            20.0,
        )))
        .with_boxed_evaluator(evaluator)
        .with_selection(TournamentSelection::default())
        .with_crossover(PhenotypeCrossover::new(0.5).unwrap())
        .with_elitism(StandardElitism::new(0.1).unwrap())
        .with_terminator(GenerationCountTerminator::new(10))
        .with_seeder(|rng: &mut RandomNumberGenerator| TestPhenotype {
            value: rng.gen_index(200) as i32 - 100,
        })
        .with_seed(8)
        .build()
        .unwrap();

    algorithm.run().unwrap();
    assert_eq!(algorithm.environment().populations()[0].len(), 20);
}

#[test]
fn test_evolution_with_caching() {
    let uncached = CostlyEvaluator::new();
    run_steady_state(Box::new(uncached.clone()));

    let global = CostlyEvaluator::new();
    run_steady_state(global.clone().with_cache(CacheType::Global));

    let thread_local = CostlyEvaluator::new();
    run_steady_state(thread_local.clone().with_cache(CacheType::ThreadLocal));

    // Survivors are re-scored every generation; the caches absorb those calls.
    assert!(
        global.get_evaluations() < uncached.get_evaluations(),
        "global cache: {} vs {}",
        global.get_evaluations(),
        uncached.get_evaluations()
    );
    assert!(thread_local.get_evaluations() < uncached.get_evaluations());
}

#[test]
fn test_separate_caches_do_not_share() {
    let evaluator = CostlyEvaluator::new();
    let first = evaluator.clone().with_global_cache();
    let second = evaluator.clone().with_global_cache();
    let phenotype = TestPhenotype { value: 42 };

    first.evaluate_fitness(&phenotype).unwrap();
    second.evaluate_fitness(&phenotype).unwrap();

    assert_eq!(evaluator.get_evaluations(), 2);
}
