use tracing::trace;

use crate::entity::{Entity, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::{indices_worst_to_best, selection_values, SelectionOperator};

/// Weighted random choice over a list of slices.
///
/// The sampler builds cumulative percentage ranges from the weights and draws
/// one uniform value in `[0, 100)`; the slice whose range contains the draw
/// wins. When every weight is zero it falls back to a uniform random index.
///
/// # Examples
///
/// ```
/// use gaengine::rng::RandomNumberGenerator;
/// use gaengine::selection::RouletteWheelSampler;
///
/// let mut rng = RandomNumberGenerator::from_seed(5);
/// let index = RouletteWheelSampler::sample_index(&[0.0, 3.0, 0.0], &mut rng).unwrap();
/// assert_eq!(index, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouletteWheelSampler;

impl RouletteWheelSampler {
    /// Picks an index with probability proportional to its weight.
    ///
    /// # Errors
    ///
    /// `EmptyPopulation` for an empty weight list, `Precondition` for a
    /// negative or non-finite weight, `InvalidNumericValue` if the weights sum
    /// to infinity.
    pub fn sample_index(weights: &[f64], rng: &mut RandomNumberGenerator) -> Result<usize> {
        if weights.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(GeneticError::Precondition(format!(
                "Roulette wheel weights must be finite and non-negative, got {}",
                bad
            )));
        }

        let total: f64 = weights.iter().sum();
        if !total.is_finite() {
            return Err(GeneticError::InvalidNumericValue(
                "Roulette wheel weights sum to infinity".to_string(),
            ));
        }

        if total == 0.0 {
            trace!("all roulette wheel weights are zero, sampling uniformly");
            return Ok(rng.gen_index(weights.len()));
        }

        let draw = rng.gen_range_f64(0.0, 100.0);
        let mut upper = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            upper += weight / total * 100.0;
            if draw < upper {
                return Ok(index);
            }
        }

        // Accumulated rounding can leave the last range slightly short of 100.
        Ok(weights
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or(weights.len() - 1))
    }

    /// Picks one item of `slices`, each paired with its weight.
    pub fn sample<'a, T>(
        slices: &'a [(T, f64)],
        rng: &mut RandomNumberGenerator,
    ) -> Result<&'a T> {
        let weights: Vec<f64> = slices.iter().map(|(_, weight)| *weight).collect();
        let index = Self::sample_index(&weights, rng)?;
        Ok(&slices[index].0)
    }
}

/// Fitness-proportionate (roulette wheel) selection.
///
/// Each entity's slice is its fitness. When smaller values are better the
/// values are reassigned in reverse sorted order, so the best entity receives
/// the largest value, and all weights are shifted to be strictly positive
/// when the minimum is not.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct FitnessProportionateSelection {
    basis: FitnessBasis,
}

impl FitnessProportionateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads raw fitness instead of scaled fitness.
    pub fn with_basis(mut self, basis: FitnessBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Computes the wheel weights for `values`.
    pub fn wheel_weights(values: &[f64], mode: EvaluationMode) -> Vec<f64> {
        let mut weights = match mode {
            EvaluationMode::Maximize => values.to_vec(),
            EvaluationMode::Minimize => {
                // worst_to_best under Minimize is descending by value; the
                // i-th worst entity hands its value to the i-th best one.
                let order = indices_worst_to_best(values, mode);
                let mut reassigned = vec![0.0; values.len()];
                for (position, &index) in order.iter().enumerate() {
                    let mirror = order[order.len() - 1 - position];
                    reassigned[index] = values[mirror];
                }
                reassigned
            }
        };

        let min = weights.iter().cloned().fold(f64::INFINITY, f64::min);
        if min <= 0.0 {
            let offset = min.abs() + 1.0;
            weights.iter_mut().for_each(|w| *w += offset);
        }

        weights
    }
}

impl<P: Phenotype> SelectionOperator<P> for FitnessProportionateSelection {
    fn selection_basis(&self) -> FitnessBasis {
        self.basis
    }

    fn select_index(
        &self,
        entities: &[Entity<P>],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let values = selection_values(entities, self.basis)?;
        let weights = Self::wheel_weights(&values, mode);
        RouletteWheelSampler::sample_index(&weights, rng)
    }
}
