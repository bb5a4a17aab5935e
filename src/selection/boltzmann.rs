//! # Boltzmann Selection
//!
//! Selection whose pressure is controlled by a temperature. Each entity's wheel
//! slice is `exp(fitness / temperature)`: a hot population is sampled almost
//! uniformly, a cold one almost greedily. An [`AnnealingSchedule`] lowers (or
//! otherwise adjusts) the temperature once per generation.

use std::fmt::Debug;

use tracing::debug;

use crate::entity::{Entity, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;
use crate::selection::roulette::RouletteWheelSampler;
use crate::selection::selection_strategy::{selection_values, SelectionOperator};

/// Computes the temperature for the next generation.
pub trait AnnealingSchedule: Debug + Send {
    /// Returns the temperature to use after `generation` was created.
    fn next_temperature(&self, current: f64, generation: usize) -> f64;
}

/// Keeps the temperature constant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTemperature;

impl AnnealingSchedule for FixedTemperature {
    fn next_temperature(&self, current: f64, _generation: usize) -> f64 {
        current
    }
}

/// Lowers the temperature by a fixed amount every generation, down to a floor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct LinearAnnealing {
    decrement: f64,
    minimum: f64,
}

impl LinearAnnealing {
    /// # Errors
    ///
    /// `Configuration` if `decrement` is negative or `minimum` is not positive.
    pub fn new(decrement: f64, minimum: f64) -> Result<Self> {
        if !(decrement.is_finite() && decrement >= 0.0) {
            return Err(GeneticError::Configuration(
                "Linear annealing decrement must be a non-negative number".to_string(),
            ));
        }
        validate_minimum(minimum)?;
        Ok(Self { decrement, minimum })
    }
}

impl AnnealingSchedule for LinearAnnealing {
    fn next_temperature(&self, current: f64, _generation: usize) -> f64 {
        (current - self.decrement).max(self.minimum)
    }
}

/// Multiplies the temperature by a constant factor every generation, down to a floor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct ExponentialAnnealing {
    factor: f64,
    minimum: f64,
}

impl ExponentialAnnealing {
    /// # Errors
    ///
    /// `Configuration` if `factor` is outside `(0, 1]` or `minimum` is not positive.
    pub fn new(factor: f64, minimum: f64) -> Result<Self> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(GeneticError::Configuration(
                "Exponential annealing factor must be in the range (0, 1]".to_string(),
            ));
        }
        validate_minimum(minimum)?;
        Ok(Self { factor, minimum })
    }
}

impl AnnealingSchedule for ExponentialAnnealing {
    fn next_temperature(&self, current: f64, _generation: usize) -> f64 {
        (current * self.factor).max(self.minimum)
    }
}

fn validate_minimum(minimum: f64) -> Result<()> {
    if !(minimum.is_finite() && minimum > 0.0) {
        return Err(GeneticError::Configuration(
            "Minimum temperature must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// Boltzmann (temperature-based) selection.
#[derive(Debug)]
pub struct BoltzmannSelection {
    initial_temperature: f64,
    temperature: f64,
    schedule: Box<dyn AnnealingSchedule>,
    basis: FitnessBasis,
}

impl BoltzmannSelection {
    /// Creates a Boltzmann selection that starts at `initial_temperature` and
    /// is annealed by `schedule`.
    ///
    /// # Errors
    ///
    /// `Configuration` if the temperature is not a positive finite number.
    pub fn new<S>(initial_temperature: f64, schedule: S) -> Result<Self>
    where
        S: AnnealingSchedule + 'static,
    {
        if !(initial_temperature.is_finite() && initial_temperature > 0.0) {
            return Err(GeneticError::Configuration(
                "Boltzmann temperature must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            initial_temperature,
            temperature: initial_temperature,
            schedule: Box::new(schedule),
            basis: FitnessBasis::Scaled,
        })
    }

    pub fn with_basis(mut self, basis: FitnessBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Computes `exp(value / temperature)` for every value.
    ///
    /// # Errors
    ///
    /// `BoltzmannOverflow` as soon as a weight or the running sum of weights is
    /// no longer finite.
    pub fn boltzmann_weights(&self, values: &[f64]) -> Result<Vec<f64>> {
        let mut sum = 0.0_f64;
        let mut weights = Vec::with_capacity(values.len());

        for value in values {
            let weight = (value / self.temperature).exp();
            sum += weight;
            if !weight.is_finite() || !sum.is_finite() {
                return Err(GeneticError::BoltzmannOverflow {
                    temperature: self.temperature,
                });
            }
            weights.push(weight);
        }

        Ok(weights)
    }
}

impl<P: Phenotype> SelectionOperator<P> for BoltzmannSelection {
    fn selection_basis(&self) -> FitnessBasis {
        self.basis
    }

    fn select_index(
        &self,
        entities: &[Entity<P>],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let mut values = selection_values(entities, self.basis)?;
        if mode == EvaluationMode::Minimize {
            values.iter_mut().for_each(|v| *v = -*v);
        }
        let weights = self.boltzmann_weights(&values)?;
        RouletteWheelSampler::sample_index(&weights, rng)
    }

    fn on_generation_created(&mut self, generation: usize) {
        let next = self.schedule.next_temperature(self.temperature, generation);
        if next.is_finite() && next > 0.0 {
            self.temperature = next;
        }
        debug!(generation, temperature = self.temperature, "annealed Boltzmann temperature");
    }

    fn reset(&mut self) {
        self.temperature = self.initial_temperature;
    }
}
