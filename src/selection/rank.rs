use crate::entity::{Entity, FitnessBasis};
use crate::error::Result;
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;
use crate::selection::roulette::RouletteWheelSampler;
use crate::selection::selection_strategy::{indices_worst_to_best, selection_values, SelectionOperator};

/// A selection strategy that weights entities by their rank.
///
/// Entities are sorted by fitness and the wheel slice of each is its rank
/// position: the worst entity gets weight 1 and the best gets weight N,
/// regardless of the absolute fitness values. This keeps selection pressure
/// steady when a few entities are far fitter than the rest, and works for
/// negative fitness values and both evaluation modes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct RankSelection {
    basis: FitnessBasis,
}

impl RankSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(mut self, basis: FitnessBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Returns the rank weight of each value, in the order of `values`.
    pub fn rank_weights(values: &[f64], mode: EvaluationMode) -> Vec<f64> {
        let mut weights = vec![0.0; values.len()];
        for (position, index) in indices_worst_to_best(values, mode).into_iter().enumerate() {
            weights[index] = (position + 1) as f64;
        }
        weights
    }
}

impl<P: Phenotype> SelectionOperator<P> for RankSelection {
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
        let weights = Self::rank_weights(&values, mode);
        RouletteWheelSampler::sample_index(&weights, rng)
    }
}
