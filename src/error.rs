//! # Error Types
//!
//! This module defines the error type shared by every part of the engine.
//! Configuration problems, contract violations, numeric failures and failures
//! raised by pluggable operators all surface as a [`GeneticError`].
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use gaengine::error::{GeneticError, Result};
//!
//! fn validate_rate(rate: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&rate) {
//!         return Err(GeneticError::Configuration(format!(
//!             "Rate must be in the range [0, 1], got {}",
//!             rate
//!         )));
//!     }
//!     Ok(rate)
//! }
//!
//! assert!(validate_rate(0.5).is_ok());
//! assert!(validate_rate(1.5).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use gaengine::error::{GeneticError, OptionExt};
//!
//! fn find_best_candidate(candidates: &[i32]) -> gaengine::error::Result<i32> {
//!     candidates.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//! ```

use thiserror::Error;

use crate::evolution::ExecutionState;

/// Represents errors that can occur while configuring or running the engine.
///
/// The type is `Clone` so the execution context can keep a copy of the last
/// failure while the original is handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticError {
    /// Invalid operator parameters or algorithm options, detected before a run starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation required at least one entity.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A programming-contract violation, such as reading the fitness of an
    /// entity that has not been evaluated yet.
    #[error("Precondition violation: {0}")]
    Precondition(String),

    /// The fitness evaluator failed or produced a non-finite score.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// The running sum of Boltzmann weights exceeded the range of `f64`.
    #[error("Boltzmann selection overflow: sum of exp(fitness / temperature) exceeded the representable range at temperature {temperature}")]
    BoltzmannOverflow { temperature: f64 },

    /// A crossover, mutation or other variation operator failed.
    #[error("Operator error: {0}")]
    Operator(String),

    /// NaN or infinity encountered where a finite value is required.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A controller operation was requested in a state that does not permit it.
    #[error("Cannot {operation} while the algorithm is {state:?}")]
    InvalidExecutionState {
        operation: &'static str,
        state: ExecutionState,
    },

    /// A generation could not be completed.
    #[error("Evolution error: {0}")]
    Evolution(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for engine operations.
///
/// ```rust
/// use gaengine::error::Result;
///
/// fn may_fail() -> Result<i32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using a closure
    /// to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
