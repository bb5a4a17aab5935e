//! # Observers
//!
//! An [`AlgorithmObserver`] is notified at the milestones of a run. Observers
//! are called on the thread that executes the generation (the controller's
//! worker thread during `run`), with the algorithm locked, so they see a
//! consistent environment but should return quickly.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::population::Environment;

/// Returned by [`AlgorithmObserver::fitness_evaluated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunControl {
    #[default]
    Continue,
    /// Completes the run after the current generation.
    Terminate,
}

pub trait AlgorithmObserver<P: Phenotype>: Send {
    /// The initial populations were seeded and evaluated.
    fn algorithm_starting(&mut self, _environment: &Environment<P>) {}

    /// A new generation exists but has not been evaluated yet.
    fn generation_created(&mut self, _environment: &Environment<P>, _generation: usize) {}

    /// The generation was evaluated and scaled.
    fn fitness_evaluated(&mut self, _environment: &Environment<P>, _generation: usize) -> RunControl {
        RunControl::Continue
    }

    /// The run completed after `generation`.
    fn algorithm_completed(&mut self, _environment: &Environment<P>, _generation: usize) {}
}

/// A notification published by [`EventChannelObserver`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmEvent {
    AlgorithmStarting {
        entity_count: usize,
    },
    GenerationCreated {
        generation: usize,
    },
    FitnessEvaluated {
        generation: usize,
        best_fitness: Option<f64>,
    },
    AlgorithmCompleted {
        generation: usize,
        best_fitness: Option<f64>,
    },
}

/// Publishes every notification as an [`AlgorithmEvent`] on a channel.
///
/// Events are dropped silently once the receiver is gone.
///
/// ```
/// use gaengine::evaluation::EvaluationMode;
/// use gaengine::evolution::{AlgorithmEvent, AlgorithmObserver, EventChannelObserver};
/// use gaengine::population::Environment;
/// # #[derive(Clone, Debug)]
/// # struct Dummy;
/// # impl gaengine::phenotype::Phenotype for Dummy {
/// #     fn crossover(&mut self, _other: &Self) {}
/// #     fn mutate(&mut self, _rng: &mut gaengine::rng::RandomNumberGenerator) {}
/// # }
///
/// let (mut observer, events) = EventChannelObserver::channel(EvaluationMode::Maximize);
/// AlgorithmObserver::<Dummy>::generation_created(&mut observer, &Environment::empty(), 3);
/// assert_eq!(events.try_recv().unwrap(), AlgorithmEvent::GenerationCreated { generation: 3 });
/// ```
#[derive(Debug, Clone)]
pub struct EventChannelObserver {
    sender: Sender<AlgorithmEvent>,
    mode: EvaluationMode,
}

impl EventChannelObserver {
    /// `mode` decides which raw fitness is reported as the best.
    pub fn new(sender: Sender<AlgorithmEvent>, mode: EvaluationMode) -> Self {
        Self { sender, mode }
    }

    /// Creates an observer together with the receiving end of its channel.
    pub fn channel(mode: EvaluationMode) -> (Self, Receiver<AlgorithmEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender, mode), receiver)
    }

    fn publish(&self, event: AlgorithmEvent) {
        // A disconnected receiver only means nobody listens anymore.
        let _ = self.sender.send(event);
    }
}

impl<P: Phenotype> AlgorithmObserver<P> for EventChannelObserver {
    fn algorithm_starting(&mut self, environment: &Environment<P>) {
        self.publish(AlgorithmEvent::AlgorithmStarting {
            entity_count: environment.entity_count(),
        });
    }

    fn generation_created(&mut self, _environment: &Environment<P>, generation: usize) {
        self.publish(AlgorithmEvent::GenerationCreated { generation });
    }

    fn fitness_evaluated(&mut self, environment: &Environment<P>, generation: usize) -> RunControl {
        self.publish(AlgorithmEvent::FitnessEvaluated {
            generation,
            best_fitness: environment.best_fitness(self.mode).ok(),
        });
        RunControl::Continue
    }

    fn algorithm_completed(&mut self, environment: &Environment<P>, generation: usize) {
        self.publish(AlgorithmEvent::AlgorithmCompleted {
            generation,
            best_fitness: environment.best_fitness(self.mode).ok(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::population::Population;
    use crate::rng::RandomNumberGenerator;

    #[derive(Clone, Debug)]
    struct TestPhenotype;

    impl Phenotype for TestPhenotype {
        fn crossover(&mut self, _other: &Self) {}

        fn mutate(&mut self, _rng: &mut RandomNumberGenerator) {}
    }

    #[test]
    fn test_events_carry_best_fitness() {
        let (mut observer, events) = EventChannelObserver::channel(EvaluationMode::Minimize);
        let entities = [4.0, 2.0, 9.0]
            .iter()
            .map(|&value| {
                let mut entity = Entity::new(TestPhenotype);
                entity.set_raw_fitness(value, 1);
                entity
            })
            .collect();
        let environment = Environment::new(vec![Population::from_entities(0, entities)]);

        observer.algorithm_starting(&environment);
        assert_eq!(
            observer.fitness_evaluated(&environment, 1),
            RunControl::Continue
        );
        observer.algorithm_completed(&environment, 1);

        let received: Vec<AlgorithmEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                AlgorithmEvent::AlgorithmStarting { entity_count: 3 },
                AlgorithmEvent::FitnessEvaluated {
                    generation: 1,
                    best_fitness: Some(2.0)
                },
                AlgorithmEvent::AlgorithmCompleted {
                    generation: 1,
                    best_fitness: Some(2.0)
                },
            ]
        );
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (mut observer, events) = EventChannelObserver::channel(EvaluationMode::Maximize);
        drop(events);
        AlgorithmObserver::<TestPhenotype>::generation_created(
            &mut observer,
            &Environment::empty(),
            1,
        );
    }
}
