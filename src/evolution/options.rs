//! # AlgorithmOptions
//!
//! The `AlgorithmOptions` struct holds the size-related configuration of a
//! genetic algorithm: how many populations (demes) it evolves, how many
//! entities each population holds, and from which batch size fitness
//! evaluation switches to rayon's thread pool.
//!
//! ## Example
//!
//! ```rust
//! use gaengine::evolution::options::AlgorithmOptions;
//!
//! let options = AlgorithmOptions::builder()
//!     .population_size(50)
//!     .population_count(4)
//!     .parallel_threshold(200)
//!     .build();
//!
//! assert_eq!(options.get_population_size(), 50);
//! assert!(options.validate().is_ok());
//!
//! let default_options = AlgorithmOptions::default();
//! assert_eq!(default_options.get_population_count(), 1);
//! ```

use crate::error::{GeneticError, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmOptions {
    population_size: usize,
    population_count: usize,
    /// Minimum number of pending evaluations scored in parallel
    parallel_threshold: usize,
}

impl AlgorithmOptions {
    pub fn new(population_size: usize, population_count: usize) -> Self {
        Self {
            population_size,
            population_count,
            parallel_threshold: 1000,
        }
    }

    /// Target number of entities of every population.
    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    /// Number of populations in the environment.
    pub fn get_population_count(&self) -> usize {
        self.population_count
    }

    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    pub fn set_population_count(&mut self, population_count: usize) {
        self.population_count = population_count;
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Checks the options before a run starts.
    ///
    /// # Errors
    ///
    /// `Configuration` if the population size or count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if self.population_count == 0 {
            return Err(GeneticError::Configuration(
                "Population count cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a builder for creating an `AlgorithmOptions` instance.
    pub fn builder() -> AlgorithmOptionsBuilder {
        AlgorithmOptionsBuilder::default()
    }
}

impl Default for AlgorithmOptions {
    fn default() -> Self {
        Self {
            population_size: 20,
            population_count: 1,
            parallel_threshold: 1000,
        }
    }
}

/// Builder for `AlgorithmOptions`.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmOptionsBuilder {
    population_size: Option<usize>,
    population_count: Option<usize>,
    parallel_threshold: Option<usize>,
}

impl AlgorithmOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn population_count(mut self, value: usize) -> Self {
        self.population_count = Some(value);
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    pub fn build(self) -> AlgorithmOptions {
        let defaults = AlgorithmOptions::default();
        AlgorithmOptions {
            population_size: self.population_size.unwrap_or(defaults.population_size),
            population_count: self.population_count.unwrap_or(defaults.population_count),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(defaults.parallel_threshold),
        }
    }
}
