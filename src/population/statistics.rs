use crate::error::{GeneticError, Result};

/// Aggregate statistics over one fitness basis of a population.
///
/// `std_dev` is the population standard deviation (divides by `n`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl FitnessSummary {
    /// Computes the summary of `values`.
    ///
    /// # Errors
    ///
    /// `EmptyPopulation` when `values` is empty, `InvalidNumericValue` when a
    /// value is NaN or infinite.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Cannot summarize non-finite fitness value {}",
                bad
            )));
        }

        let count = values.len() as f64;
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        let mean = sum / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

        Ok(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}
