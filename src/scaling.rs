//! # Fitness Scaling
//!
//! Scaling turns the raw fitness of every entity of a population into the
//! scaled fitness that elitism and (by default) selection read. Scaled values
//! keep the orientation of the evaluation mode: under `Minimize` a smaller
//! scaled value is still better.

use std::fmt::Debug;

use crate::entity::FitnessBasis;
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::population::Population;

pub trait FitnessScalingStrategy<P: Phenotype>: Debug + Send {
    /// Sets the scaled fitness of every entity of `population`.
    ///
    /// Called once the whole population carries raw fitness for the current
    /// generation.
    fn update_scaled_fitness(
        &self,
        population: &mut Population<P>,
        mode: EvaluationMode,
    ) -> Result<()>;
}

/// Scaled fitness equals raw fitness.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScaling;

impl<P: Phenotype> FitnessScalingStrategy<P> for NoScaling {
    fn update_scaled_fitness(
        &self,
        population: &mut Population<P>,
        _mode: EvaluationMode,
    ) -> Result<()> {
        for entity in population.entities_mut() {
            let raw = entity.fitness(FitnessBasis::Raw)?;
            entity.set_scaled_fitness(raw);
        }
        Ok(())
    }
}

/// `scaled = multiplier * raw + offset`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct LinearScaling {
    multiplier: f64,
    offset: f64,
}

impl LinearScaling {
    /// # Errors
    ///
    /// `Configuration` if `multiplier` is not positive or `offset` is not finite.
    pub fn new(multiplier: f64, offset: f64) -> Result<Self> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(GeneticError::Configuration(
                "Linear scaling multiplier must be a positive number".to_string(),
            ));
        }
        if !offset.is_finite() {
            return Err(GeneticError::Configuration(
                "Linear scaling offset must be finite".to_string(),
            ));
        }
        Ok(Self { multiplier, offset })
    }
}

impl<P: Phenotype> FitnessScalingStrategy<P> for LinearScaling {
    fn update_scaled_fitness(
        &self,
        population: &mut Population<P>,
        _mode: EvaluationMode,
    ) -> Result<()> {
        for entity in population.entities_mut() {
            let raw = entity.fitness(FitnessBasis::Raw)?;
            entity.set_scaled_fitness(self.multiplier * raw + self.offset);
        }
        Ok(())
    }
}

/// Sigma truncation.
///
/// With `band = multiplier * std_dev`, entities worse than `mean ∓ band`
/// are clamped to that edge, then every value is shifted by `mean - band`.
/// Under `Maximize` this is `max(0, raw - (mean - band))`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SigmaScaling {
    multiplier: f64,
}

impl SigmaScaling {
    /// # Errors
    ///
    /// `Configuration` if `multiplier` is not positive.
    pub fn new(multiplier: f64) -> Result<Self> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(GeneticError::Configuration(
                "Sigma scaling multiplier must be a positive number".to_string(),
            ));
        }
        Ok(Self { multiplier })
    }
}

impl<P: Phenotype> FitnessScalingStrategy<P> for SigmaScaling {
    fn update_scaled_fitness(
        &self,
        population: &mut Population<P>,
        mode: EvaluationMode,
    ) -> Result<()> {
        let statistics = match population.raw_statistics().cloned() {
            Some(statistics) => statistics,
            None => population.refresh_raw_statistics()?.clone(),
        };
        let band = self.multiplier * statistics.std_dev;
        let floor = statistics.mean - band;
        let ceiling = statistics.mean + band;

        for entity in population.entities_mut() {
            let raw = entity.fitness(FitnessBasis::Raw)?;
            let scaled = match mode {
                EvaluationMode::Maximize => raw.max(floor) - floor,
                EvaluationMode::Minimize => raw.min(ceiling) - floor,
            };
            entity.set_scaled_fitness(scaled);
        }
        Ok(())
    }
}
