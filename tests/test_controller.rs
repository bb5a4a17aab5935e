use gaengine::{
    error::Result,
    evaluation::{EvaluationMode, FitnessEvaluator},
    evolution::{
        AlgorithmEvent, AlgorithmOptions, EventChannelObserver, ExecutionController,
        ExecutionState, GeneticAlgorithm, GeneticAlgorithmBuilder,
    },
    operators::{PhenotypeCrossover, PhenotypeMutation},
    phenotype::Phenotype,
    rng::RandomNumberGenerator,
    selection::TournamentSelection,
    termination::GenerationCountTerminator,
    GeneticError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug)]
struct Scalar {
    value: f64,
}

impl Phenotype for Scalar {
    fn crossover(&mut self, other: &Self) {
        self.value = (self.value + other.value) / 2.0;
    }

    fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
        self.value += rng.gen_range_f64(-1.0, 1.0);
    }
}

/// Distance to zero, optionally slowed down, optionally failing after a
/// number of evaluations. While `hold` is set every evaluation blocks; while
/// `explode` is set every evaluation panics.
#[derive(Clone, Default)]
struct Distance {
    delay: Option<Duration>,
    fail_after: Option<usize>,
    evaluations: Arc<AtomicUsize>,
    hold: Arc<AtomicBool>,
    explode: Arc<AtomicBool>,
}

impl FitnessEvaluator<Scalar> for Distance {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Minimize
    }

    fn evaluate_fitness(&self, phenotype: &Scalar) -> Result<f64> {
        while self.hold.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        if self.explode.load(Ordering::SeqCst) {
            panic!("evaluator exploded");
        }
        let count = self.evaluations.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| count >= limit) {
            return Err(GeneticError::FitnessCalculation(
                "evaluation budget exhausted".to_string(),
            ));
        }
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        Ok(phenotype.value.abs())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn builder(evaluator: Distance) -> GeneticAlgorithmBuilder<Scalar> {
    GeneticAlgorithmBuilder::new()
        .with_options(AlgorithmOptions::new(10, 1))
        .with_evaluator(evaluator)
        .with_selection(TournamentSelection::default())
        .with_crossover(PhenotypeCrossover::new(0.9).unwrap())
        .with_mutation(PhenotypeMutation::new(0.5).unwrap())
        .with_seeder(|rng: &mut RandomNumberGenerator| Scalar {
            value: rng.gen_range_f64(-50.0, 50.0),
        })
        .with_seed(13)
}

fn slow() -> Distance {
    Distance {
        delay: Some(Duration::from_millis(1)),
        ..Distance::default()
    }
}

fn generation(controller: &ExecutionController<Scalar>) -> usize {
    controller.with_algorithm(GeneticAlgorithm::generation).unwrap()
}

fn initializations(controller: &ExecutionController<Scalar>) -> usize {
    controller
        .with_algorithm(GeneticAlgorithm::initializations)
        .unwrap()
}

#[test]
fn test_pause_and_resume_without_reinitializing() {
    init_tracing();
    let evaluator = slow();
    let hold = Arc::clone(&evaluator.hold);
    let (observer, events) = EventChannelObserver::channel(EvaluationMode::Minimize);
    let algorithm = builder(evaluator).with_observer(observer).build().unwrap();
    let mut controller = ExecutionController::new(algorithm);

    controller.run().unwrap();
    thread::sleep(Duration::from_millis(20));
    // Park the worker inside a generation so the pause cannot settle yet.
    hold.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    controller.pause();
    assert_eq!(controller.state(), ExecutionState::PausePending);

    hold.store(false, Ordering::SeqCst);
    controller.wait().unwrap();
    assert_eq!(controller.state(), ExecutionState::Paused);
    let paused_at = generation(&controller);
    assert!(paused_at > 0);

    controller.run().unwrap();
    thread::sleep(Duration::from_millis(50));
    controller.stop();
    controller.wait().unwrap();

    assert_eq!(controller.state(), ExecutionState::Idle);
    let stopped_at = generation(&controller);
    assert!(stopped_at > paused_at);
    assert_eq!(initializations(&controller), 1);
    assert_eq!(controller.last_error(), None);

    // One seeding, and the generation counter carries on across the resume.
    let events: Vec<AlgorithmEvent> = events.try_iter().collect();
    let starts = events
        .iter()
        .filter(|event| matches!(event, AlgorithmEvent::AlgorithmStarting { .. }))
        .count();
    assert_eq!(starts, 1);
    let created: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            AlgorithmEvent::GenerationCreated { generation } => Some(*generation),
            _ => None,
        })
        .collect();
    assert_eq!(created, (1..=stopped_at).collect::<Vec<_>>());
}

#[test]
fn test_run_and_step_rejected_while_running() {
    init_tracing();
    let mut controller = ExecutionController::new(builder(slow()).build().unwrap());

    controller.run().unwrap();
    assert!(matches!(
        controller.step(),
        Err(GeneticError::InvalidExecutionState { operation: "step", .. })
    ));
    assert!(matches!(
        controller.run(),
        Err(GeneticError::InvalidExecutionState { operation: "run", .. })
    ));

    controller.stop();
    controller.stop();
    controller.wait().unwrap();
    assert_eq!(controller.state(), ExecutionState::Idle);
}

#[test]
fn test_step_settles_in_paused() {
    init_tracing();
    let mut controller = ExecutionController::new(builder(Distance::default()).build().unwrap());

    controller.step().unwrap();
    assert_eq!(controller.state(), ExecutionState::Paused);
    assert_eq!(generation(&controller), 1);

    controller.step().unwrap();
    assert_eq!(generation(&controller), 2);
    assert_eq!(initializations(&controller), 1);

    // Stop from Paused takes effect immediately.
    controller.stop();
    assert_eq!(controller.state(), ExecutionState::Idle);

    // The next start from Idle is a fresh run.
    controller.step().unwrap();
    assert_eq!(generation(&controller), 1);
    assert_eq!(initializations(&controller), 2);
}

#[test]
fn test_explicit_initialize_is_used_by_the_next_run() {
    init_tracing();
    let algorithm = builder(Distance::default())
        .with_terminator(GenerationCountTerminator::new(3))
        .build()
        .unwrap();
    let mut controller = ExecutionController::new(algorithm);

    controller.initialize().unwrap();
    assert_eq!(controller.state(), ExecutionState::Idle);
    controller.run().unwrap();
    controller.wait().unwrap();

    assert_eq!(generation(&controller), 3);
    assert_eq!(initializations(&controller), 1);
}

#[test]
fn test_configuration_error_leaves_controller_idle() {
    init_tracing();
    let algorithm = builder(Distance::default())
        .with_options(AlgorithmOptions::new(0, 1))
        .build()
        .unwrap();
    let mut controller = ExecutionController::new(algorithm);

    let error = controller.run().unwrap_err();

    assert!(matches!(error, GeneticError::Configuration(_)));
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert_eq!(controller.last_error(), Some(error));
    // Nothing was spawned.
    controller.wait().unwrap();
}

#[test]
fn test_generation_error_is_returned_by_wait() {
    init_tracing();
    let evaluator = Distance {
        fail_after: Some(25),
        ..Distance::default()
    };
    let mut controller = ExecutionController::new(builder(evaluator).build().unwrap());

    controller.run().unwrap();
    let error = controller.wait().unwrap_err();

    assert!(matches!(error, GeneticError::FitnessCalculation(_)));
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert_eq!(controller.last_error(), Some(error));
}

#[test]
fn test_step_returns_generation_error() {
    init_tracing();
    let evaluator = Distance {
        fail_after: Some(12),
        ..Distance::default()
    };
    let mut controller = ExecutionController::new(builder(evaluator).build().unwrap());

    assert!(matches!(
        controller.step(),
        Err(GeneticError::FitnessCalculation(_))
    ));
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert!(controller.last_error().is_some());
}

#[test]
fn test_completion_fires_once() {
    init_tracing();
    let (observer, events) = EventChannelObserver::channel(EvaluationMode::Minimize);
    let algorithm = builder(Distance::default())
        .with_terminator(GenerationCountTerminator::new(5))
        .with_observer(observer)
        .build()
        .unwrap();
    let mut controller = ExecutionController::new(algorithm);

    controller.run().unwrap();
    controller.wait().unwrap();

    assert_eq!(controller.state(), ExecutionState::Idle);
    let completions: Vec<usize> = events
        .try_iter()
        .filter_map(|event| match event {
            AlgorithmEvent::AlgorithmCompleted { generation, .. } => Some(generation),
            _ => None,
        })
        .collect();
    assert_eq!(completions, vec![5]);
}

#[test]
fn test_stop_through_shared_context() {
    init_tracing();
    let mut controller = ExecutionController::new(builder(slow()).build().unwrap());
    let context = controller.context();

    controller.run().unwrap();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        context.request_stop();
    });
    stopper.join().unwrap();
    controller.wait().unwrap();

    assert_eq!(controller.state(), ExecutionState::Idle);
}

#[test]
fn test_panicking_run_is_reported_and_recoverable() {
    init_tracing();
    let evaluator = slow();
    let explode = Arc::clone(&evaluator.explode);
    let mut controller = ExecutionController::new(builder(evaluator).build().unwrap());

    controller.run().unwrap();
    thread::sleep(Duration::from_millis(20));
    explode.store(true, Ordering::SeqCst);
    let error = controller.wait().unwrap_err();

    assert!(matches!(error, GeneticError::Evolution(_)));
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert_eq!(controller.last_error(), Some(error));

    // The next start is a fresh run on a usable algorithm.
    explode.store(false, Ordering::SeqCst);
    controller.step().unwrap();
    assert_eq!(controller.state(), ExecutionState::Paused);
    assert_eq!(generation(&controller), 1);
    assert_eq!(initializations(&controller), 2);
    assert_eq!(controller.last_error(), None);
}

#[test]
fn test_panicking_step_is_reported_and_recoverable() {
    init_tracing();
    let evaluator = Distance::default();
    let explode = Arc::clone(&evaluator.explode);
    let mut controller = ExecutionController::new(builder(evaluator).build().unwrap());

    controller.step().unwrap();
    explode.store(true, Ordering::SeqCst);
    assert!(matches!(controller.step(), Err(GeneticError::Evolution(_))));
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert!(matches!(
        controller.last_error(),
        Some(GeneticError::Evolution(_))
    ));

    explode.store(false, Ordering::SeqCst);
    controller.run().unwrap();
    thread::sleep(Duration::from_millis(20));
    controller.stop();
    controller.wait().unwrap();
    assert_eq!(controller.state(), ExecutionState::Idle);
    assert_eq!(initializations(&controller), 2);
    assert_eq!(controller.last_error(), None);
}
