use crate::entity::Entity;
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::SelectionOperator;

/// Picks any entity with equal probability, ignoring fitness.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelection;

impl UniformSelection {
    pub fn new() -> Self {
        Self
    }
}

impl<P: Phenotype> SelectionOperator<P> for UniformSelection {
    fn select_index(
        &self,
        entities: &[Entity<P>],
        _mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if entities.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(rng.gen_index(entities.len()))
    }
}
