//! # Execution controller
//!
//! [`ExecutionController`] drives a [`GeneticAlgorithm`] interactively. `run`
//! evolves generations on a dedicated worker thread until the run completes or
//! the caller pauses or stops it; `step` performs exactly one generation on the
//! caller thread. Pause and stop requests are honoured between generations, so
//! an in-flight generation always finishes.
//!
//! The current [`ExecutionState`] and the last failure live in an
//! [`ExecutionContext`] shared with the worker thread:
//!
//! | From                      | Operation          | To                            |
//! |---------------------------|--------------------|-------------------------------|
//! | `Idle`                    | run                | `Running` (fresh run)         |
//! | `Paused`                  | run                | `Running` (resumed)           |
//! | `Running`                 | pause              | `PausePending`, then `Paused` |
//! | `Running`, `PausePending` | stop               | `IdlePending`, then `Idle`    |
//! | `Paused`                  | stop               | `Idle`                        |
//! | `Idle`, `Paused`          | step               | `Paused`, or `Idle` when done |
//! | any running state         | completion / error | `Idle`                        |
//!
//! A panic inside a generation (for example in a user evaluator) is caught and
//! reported like any other failure, as an `Evolution` error. The next fresh
//! run re-initializes the algorithm.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::GeneticAlgorithm;
use crate::error::{GeneticError, Result};
use crate::phenotype::Phenotype;

/// Execution state of a controller.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ExecutionState {
    /// No run in progress; the next run or step starts a fresh run.
    #[default]
    Idle = 0,
    /// The worker thread is evolving generations.
    Running = 1,
    /// A run is suspended between generations and can be resumed.
    Paused = 2,
    /// A pause was requested; the worker pauses at the next generation boundary.
    PausePending = 3,
    /// A stop was requested; the worker goes idle at the next generation boundary.
    IdlePending = 4,
}

impl ExecutionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Paused,
            3 => Self::PausePending,
            4 => Self::IdlePending,
            _ => Self::Idle,
        }
    }
}

/// Shared execution state plus the last recorded failure.
///
/// The context outlives individual run and pause cycles, so it can be handed
/// to other threads that only want to observe or stop a run.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    state: AtomicU8,
    last_error: Mutex<Option<GeneticError>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExecutionState {
        ExecutionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The error that ended the most recent run, if any.
    pub fn last_error(&self) -> Option<GeneticError> {
        self.error_slot().clone()
    }

    /// Asks a running worker to pause at the next generation boundary.
    /// Has no effect in any other state.
    pub fn request_pause(&self) {
        if self.transition(ExecutionState::Running, ExecutionState::PausePending) {
            debug!("pause requested");
        }
    }

    /// Asks a running worker to stop at the next generation boundary; a
    /// paused run goes idle at once. Has no effect in any other state.
    pub fn request_stop(&self) {
        loop {
            let current = self.state();
            let target = match current {
                ExecutionState::Running | ExecutionState::PausePending => {
                    ExecutionState::IdlePending
                }
                ExecutionState::Paused => ExecutionState::Idle,
                ExecutionState::Idle | ExecutionState::IdlePending => return,
            };

            if self.transition(current, target) {
                if target == ExecutionState::Idle {
                    self.clear_error();
                }
                debug!(from = ?current, to = ?target, "stop requested");
                return;
            }
        }
    }

    /// Atomically moves from `from` to `to`; `false` if the state was not `from`.
    fn transition(&self, from: ExecutionState, to: ExecutionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn store(&self, state: ExecutionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn enter_idle(&self) {
        self.store(ExecutionState::Idle);
        self.clear_error();
    }

    fn fail(&self, error: GeneticError) {
        warn!(%error, "run failed");
        self.store(ExecutionState::Idle);
        *self.error_slot() = Some(error);
    }

    fn clear_error(&self) {
        *self.error_slot() = None;
    }

    fn error_slot(&self) -> MutexGuard<'_, Option<GeneticError>> {
        // A poisoned slot still holds a valid value.
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Start, step, pause and stop control over a [`GeneticAlgorithm`].
///
/// # Examples
///
/// ```
/// use gaengine::error::Result;
/// use gaengine::evaluation::FitnessEvaluator;
/// use gaengine::evolution::{AlgorithmOptions, ExecutionController, ExecutionState, GeneticAlgorithmBuilder};
/// use gaengine::operators::PhenotypeCrossover;
/// use gaengine::phenotype::Phenotype;
/// use gaengine::rng::RandomNumberGenerator;
/// use gaengine::selection::UniformSelection;
/// use gaengine::termination::GenerationCountTerminator;
///
/// #[derive(Clone, Debug)]
/// struct Bits(u8);
///
/// impl Phenotype for Bits {
///     fn crossover(&mut self, other: &Self) { self.0 |= other.0; }
///     fn mutate(&mut self, _rng: &mut RandomNumberGenerator) {}
/// }
///
/// struct Ones;
///
/// impl FitnessEvaluator<Bits> for Ones {
///     fn evaluate_fitness(&self, bits: &Bits) -> Result<f64> {
///         Ok(bits.0.count_ones() as f64)
///     }
/// }
///
/// let algorithm = GeneticAlgorithmBuilder::new()
///     .with_options(AlgorithmOptions::new(8, 1))
///     .with_evaluator(Ones)
///     .with_selection(UniformSelection::new())
///     .with_crossover(PhenotypeCrossover::default())
///     .with_terminator(GenerationCountTerminator::new(5))
///     .with_seeder(|rng: &mut RandomNumberGenerator| Bits(1 << rng.gen_index(8)))
///     .build()
///     .unwrap();
///
/// let mut controller = ExecutionController::new(algorithm);
/// controller.run().unwrap();
/// controller.wait().unwrap();
///
/// assert_eq!(controller.state(), ExecutionState::Idle);
/// assert_eq!(controller.with_algorithm(|a| a.generation()).unwrap(), 5);
/// ```
pub struct ExecutionController<P: Phenotype + 'static> {
    algorithm: Arc<Mutex<GeneticAlgorithm<P>>>,
    context: Arc<ExecutionContext>,
    worker: Option<JoinHandle<Result<()>>>,
    prepared: bool,
}

impl<P: Phenotype + 'static> ExecutionController<P> {
    pub fn new(algorithm: GeneticAlgorithm<P>) -> Self {
        Self {
            algorithm: Arc::new(Mutex::new(algorithm)),
            context: Arc::new(ExecutionContext::new()),
            worker: None,
            prepared: false,
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.context.state()
    }

    /// The shared context, for observing or stopping the run from elsewhere.
    pub fn context(&self) -> Arc<ExecutionContext> {
        Arc::clone(&self.context)
    }

    /// The error that ended the most recent run, if any.
    pub fn last_error(&self) -> Option<GeneticError> {
        self.context.last_error()
    }

    /// Prepares a fresh run without starting it. The next `run` or `step`
    /// continues from this initialization instead of seeding again.
    ///
    /// # Errors
    ///
    /// `InvalidExecutionState` unless idle; any initialization error, which
    /// is also recorded on the context.
    pub fn initialize(&mut self) -> Result<()> {
        self.require_state("initialize", &[ExecutionState::Idle])?;
        self.reap_worker();

        match self.initialize_algorithm() {
            Ok(()) => {
                self.context.clear_error();
                self.prepared = true;
                Ok(())
            }
            Err(error) => {
                self.context.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Starts a fresh run when idle, or resumes a paused one, on a worker
    /// thread. Returns once the worker was spawned; use [`wait`](Self::wait)
    /// to join it.
    ///
    /// # Errors
    ///
    /// `InvalidExecutionState` while a run is active; any initialization
    /// error of a fresh run, which leaves the controller idle.
    pub fn run(&mut self) -> Result<()> {
        match self.state() {
            ExecutionState::Idle => {
                self.reap_worker();
                self.prepare_fresh_run()?;
                if !self
                    .context
                    .transition(ExecutionState::Idle, ExecutionState::Running)
                {
                    return Err(self.invalid_state("run"));
                }
                info!("run started");
            }
            ExecutionState::Paused => {
                self.reap_worker();
                if !self
                    .context
                    .transition(ExecutionState::Paused, ExecutionState::Running)
                {
                    return Err(self.invalid_state("run"));
                }
                info!("run resumed");
            }
            _ => return Err(self.invalid_state("run")),
        }

        let algorithm = Arc::clone(&self.algorithm);
        let context = Arc::clone(&self.context);
        self.worker = Some(thread::spawn(move || run_worker(algorithm, context)));
        Ok(())
    }

    /// Performs exactly one generation on the caller thread, starting a fresh
    /// run first when idle. Settles in `Paused`, or `Idle` once complete.
    ///
    /// # Errors
    ///
    /// `InvalidExecutionState` while a run is active; any error of the
    /// generation, which leaves the controller idle with the error recorded.
    pub fn step(&mut self) -> Result<()> {
        let from = self.state();
        match from {
            ExecutionState::Idle => {
                self.reap_worker();
                self.prepare_fresh_run()?;
            }
            ExecutionState::Paused => self.reap_worker(),
            _ => return Err(self.invalid_state("step")),
        }

        if !self.context.transition(from, ExecutionState::Running) {
            return Err(self.invalid_state("step"));
        }

        match guarded(&self.algorithm, GeneticAlgorithm::step_generation) {
            Ok(true) => self.context.enter_idle(),
            Ok(false) => {
                if !self
                    .context
                    .transition(ExecutionState::IdlePending, ExecutionState::Idle)
                {
                    self.context.store(ExecutionState::Paused);
                } else {
                    self.context.clear_error();
                }
            }
            Err(error) => {
                self.context.fail(error.clone());
                return Err(error);
            }
        }
        Ok(())
    }

    /// Requests a pause at the next generation boundary. Idempotent.
    pub fn pause(&self) {
        self.context.request_pause();
    }

    /// Requests a stop at the next generation boundary; a paused run goes
    /// idle at once. Idempotent.
    pub fn stop(&self) {
        self.context.request_stop();
    }

    /// Blocks until the worker thread finished, returning the error that
    /// ended its run, if any. Returns immediately when no worker is running.
    pub fn wait(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        match worker.join() {
            Ok(result) => result,
            Err(_) => {
                let error = GeneticError::Evolution("The worker thread panicked".to_string());
                self.context.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Runs `f` against the algorithm between generations.
    ///
    /// # Errors
    ///
    /// `Evolution` if a generation panicked while holding the algorithm.
    pub fn with_algorithm<R>(&self, f: impl FnOnce(&GeneticAlgorithm<P>) -> R) -> Result<R> {
        let algorithm = self.lock_algorithm()?;
        Ok(f(&algorithm))
    }

    fn prepare_fresh_run(&mut self) -> Result<()> {
        if std::mem::take(&mut self.prepared) {
            return Ok(());
        }

        match self.initialize_algorithm() {
            Ok(()) => {
                self.context.clear_error();
                Ok(())
            }
            Err(error) => {
                self.context.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Seeds a fresh run. A lock poisoned by an earlier panic is cleared
    /// first, since initialization rebuilds the whole environment.
    fn initialize_algorithm(&self) -> Result<()> {
        self.algorithm.clear_poison();
        guarded(&self.algorithm, GeneticAlgorithm::initialize)
    }

    /// Joins a worker that already left the active states. Its outcome is
    /// already recorded on the context unless the thread itself panicked.
    fn reap_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                self.context
                    .fail(GeneticError::Evolution("The worker thread panicked".to_string()));
            }
        }
    }

    fn require_state(&self, operation: &'static str, allowed: &[ExecutionState]) -> Result<()> {
        if allowed.contains(&self.state()) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> GeneticError {
        GeneticError::InvalidExecutionState {
            operation,
            state: self.state(),
        }
    }

    fn lock_algorithm(&self) -> Result<MutexGuard<'_, GeneticAlgorithm<P>>> {
        lock(&self.algorithm)
    }
}

impl<P: Phenotype + 'static> fmt::Debug for ExecutionController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionController")
            .field("state", &self.state())
            .field("worker", &self.worker.is_some())
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}

impl<P: Phenotype + 'static> Drop for ExecutionController<P> {
    fn drop(&mut self) {
        self.context.request_stop();
        self.reap_worker();
    }
}

fn lock<P: Phenotype>(
    algorithm: &Mutex<GeneticAlgorithm<P>>,
) -> Result<MutexGuard<'_, GeneticAlgorithm<P>>> {
    algorithm.lock().map_err(|_| {
        GeneticError::Evolution("A previous generation panicked while holding the algorithm".to_string())
    })
}

/// Runs `f` on the locked algorithm, turning a panic into an `Evolution` error.
fn guarded<P, R, F>(algorithm: &Mutex<GeneticAlgorithm<P>>, f: F) -> Result<R>
where
    P: Phenotype,
    F: FnOnce(&mut GeneticAlgorithm<P>) -> Result<R>,
{
    panic::catch_unwind(AssertUnwindSafe(|| f(&mut *lock(algorithm)?))).unwrap_or_else(|payload| {
        Err(GeneticError::Evolution(format!(
            "A generation panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string())
}

/// Worker loop: one generation per iteration, honouring pause and stop
/// requests at every boundary.
fn run_worker<P: Phenotype>(
    algorithm: Arc<Mutex<GeneticAlgorithm<P>>>,
    context: Arc<ExecutionContext>,
) -> Result<()> {
    loop {
        match context.state() {
            ExecutionState::Running => {}
            ExecutionState::PausePending => {
                if context.transition(ExecutionState::PausePending, ExecutionState::Paused) {
                    info!("run paused");
                    return Ok(());
                }
                // A concurrent stop won the race; handle it on the next pass.
                continue;
            }
            ExecutionState::IdlePending => {
                context.enter_idle();
                info!("run stopped");
                return Ok(());
            }
            ExecutionState::Idle | ExecutionState::Paused => return Ok(()),
        }

        match guarded(&*algorithm, GeneticAlgorithm::step_generation) {
            Ok(false) => {}
            Ok(true) => {
                context.enter_idle();
                return Ok(());
            }
            Err(error) => {
                context.fail(error.clone());
                return Err(error);
            }
        }
    }
}
