//! # gaengine
//!
//! An evolutionary-computation engine. Candidate solutions ([`Entity`]) live
//! in populations grouped into an [`Environment`]; a [`GeneticAlgorithm`]
//! evolves them one generation at a time with a pluggable generation
//! strategy (simple, steady-state or multi-deme), selection, crossover,
//! mutation, elitism, fitness scaling and termination. An
//! [`ExecutionController`] runs the loop on a worker thread with
//! start, step, pause and stop control.
//!
//! The problem-specific parts are supplied by the caller: a [`Phenotype`]
//! (with its own crossover and mutation), a [`FitnessEvaluator`] and an
//! entity seeder.
//!
//! [`Entity`]: entity::Entity
//! [`Environment`]: population::Environment
//! [`GeneticAlgorithm`]: evolution::GeneticAlgorithm
//! [`ExecutionController`]: evolution::ExecutionController
//! [`Phenotype`]: phenotype::Phenotype
//! [`FitnessEvaluator`]: evaluation::FitnessEvaluator

pub mod elitism;
pub mod entity;
pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod operators;
pub mod phenotype;
pub mod population;
pub mod rng;
pub mod scaling;
pub mod selection;
pub mod strategy;
pub mod termination;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result};
pub use evolution::{
    AlgorithmOptions, ExecutionController, ExecutionState, GeneticAlgorithm,
    GeneticAlgorithmBuilder,
};
