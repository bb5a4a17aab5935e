//! # Termination
//!
//! A [`Terminator`] is consulted once per generation, after fitness
//! evaluation. An algorithm without a terminator runs until it is stopped.

use std::fmt::Debug;
use std::time::Duration;

use crate::entity::compare_fitness;
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::population::Environment;

/// What a terminator can look at.
#[derive(Debug)]
pub struct TerminationContext<'a, P: Phenotype> {
    /// Index of the generation just evaluated; the initial population is generation 0.
    pub generation: usize,
    /// Wall time since the run was initialized.
    pub elapsed: Duration,
    pub environment: &'a Environment<P>,
    pub evaluation_mode: EvaluationMode,
}

pub trait Terminator<P: Phenotype>: Debug + Send {
    fn is_complete(&self, context: &TerminationContext<'_, P>) -> bool;
}

/// Completes once `generations` generations were created.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct GenerationCountTerminator {
    generations: usize,
}

impl GenerationCountTerminator {
    pub fn new(generations: usize) -> Self {
        Self { generations }
    }
}

impl<P: Phenotype> Terminator<P> for GenerationCountTerminator {
    fn is_complete(&self, context: &TerminationContext<'_, P>) -> bool {
        context.generation >= self.generations
    }
}

/// Completes once the run has lasted at least `duration`.
#[derive(Debug, Clone, Copy)]
pub struct TimeDeltaTerminator {
    duration: Duration,
}

impl TimeDeltaTerminator {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<P: Phenotype> Terminator<P> for TimeDeltaTerminator {
    fn is_complete(&self, context: &TerminationContext<'_, P>) -> bool {
        context.elapsed >= self.duration
    }
}

/// Completes once the best raw fitness of the environment reaches `target`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct FitnessTargetTerminator {
    target: f64,
}

impl FitnessTargetTerminator {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl<P: Phenotype> Terminator<P> for FitnessTargetTerminator {
    fn is_complete(&self, context: &TerminationContext<'_, P>) -> bool {
        context
            .environment
            .best_fitness(context.evaluation_mode)
            .map(|best| compare_fitness(best, self.target, context.evaluation_mode).is_ge())
            .unwrap_or(false)
    }
}
