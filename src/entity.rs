//! # Entity
//!
//! An [`Entity`] is a candidate solution inside a population: a phenotype plus
//! the raw fitness computed for the current generation, the scaled fitness
//! derived from it, a cached display representation and an age counter.

use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;

/// Which fitness value an operator reads.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitnessBasis {
    /// The value produced by the fitness evaluator.
    Raw,
    /// The value produced by the fitness scaling strategy.
    #[default]
    Scaled,
}

/// Compares two fitness values so that `Ordering::Greater` means `a` is the
/// better of the two under `mode`.
pub fn compare_fitness(a: f64, b: f64, mode: EvaluationMode) -> Ordering {
    match mode {
        EvaluationMode::Maximize => a.total_cmp(&b),
        EvaluationMode::Minimize => b.total_cmp(&a),
    }
}

/// A candidate solution undergoing evolution.
#[derive(Debug, Clone)]
pub struct Entity<P: Phenotype> {
    phenotype: P,
    raw_fitness: Option<f64>,
    scaled_fitness: Option<f64>,
    fitness_generation: Option<usize>,
    representation: OnceLock<String>,
    age: usize,
}

impl<P: Phenotype> Entity<P> {
    /// Wraps a freshly created phenotype. The entity starts unevaluated with age zero.
    pub fn new(phenotype: P) -> Self {
        Self {
            phenotype,
            raw_fitness: None,
            scaled_fitness: None,
            fitness_generation: None,
            representation: OnceLock::new(),
            age: 0,
        }
    }

    pub fn phenotype(&self) -> &P {
        &self.phenotype
    }

    /// Gives mutable access to the phenotype.
    ///
    /// Any change invalidates fitness, the cached representation and the age,
    /// so the entity is re-evaluated as a new individual.
    pub fn phenotype_mut(&mut self) -> &mut P {
        self.raw_fitness = None;
        self.scaled_fitness = None;
        self.fitness_generation = None;
        self.representation = OnceLock::new();
        self.age = 0;
        &mut self.phenotype
    }

    pub fn into_phenotype(self) -> P {
        self.phenotype
    }

    pub fn raw_fitness(&self) -> Option<f64> {
        self.raw_fitness
    }

    pub fn scaled_fitness(&self) -> Option<f64> {
        self.scaled_fitness
    }

    /// Returns the requested fitness value or a precondition error when the
    /// entity has not been evaluated (or scaled) yet.
    pub fn fitness(&self, basis: FitnessBasis) -> Result<f64> {
        let value = match basis {
            FitnessBasis::Raw => self.raw_fitness,
            FitnessBasis::Scaled => self.scaled_fitness,
        };
        value.ok_or_else(|| {
            GeneticError::Precondition(format!(
                "{:?} fitness requested for an entity that has not been evaluated: {}",
                basis,
                self.representation()
            ))
        })
    }

    /// Records the raw fitness computed in `generation`. The scaled fitness is
    /// cleared until the scaling strategy runs.
    pub fn set_raw_fitness(&mut self, value: f64, generation: usize) {
        self.raw_fitness = Some(value);
        self.scaled_fitness = None;
        self.fitness_generation = Some(generation);
    }

    pub fn set_scaled_fitness(&mut self, value: f64) {
        self.scaled_fitness = Some(value);
    }

    /// Whether the raw fitness was computed during `generation`.
    pub fn is_evaluated_in(&self, generation: usize) -> bool {
        self.fitness_generation == Some(generation)
    }

    pub fn fitness_generation(&self) -> Option<usize> {
        self.fitness_generation
    }

    /// Display form of the phenotype, computed on first use.
    pub fn representation(&self) -> &str {
        self.representation
            .get_or_init(|| self.phenotype.representation())
    }

    /// Number of generations the phenotype has survived unchanged.
    pub fn age(&self) -> usize {
        self.age
    }

    pub(crate) fn increment_age(&mut self) {
        self.age += 1;
    }

    /// Orders two entities by fitness; `Ordering::Greater` means `self` is better.
    pub fn compare_to(
        &self,
        other: &Self,
        basis: FitnessBasis,
        mode: EvaluationMode,
    ) -> Result<Ordering> {
        Ok(compare_fitness(
            self.fitness(basis)?,
            other.fitness(basis)?,
            mode,
        ))
    }
}
