use crate::entity::{compare_fitness, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;

use super::Population;

/// The ordered set of populations (demes) evolved by an algorithm.
///
/// The number of populations is fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct Environment<P: Phenotype> {
    populations: Vec<Population<P>>,
}

impl<P: Phenotype> Environment<P> {
    pub fn new(populations: Vec<Population<P>>) -> Self {
        Self { populations }
    }

    pub fn empty() -> Self {
        Self {
            populations: Vec::new(),
        }
    }

    pub fn populations(&self) -> &[Population<P>] {
        &self.populations
    }

    pub fn populations_mut(&mut self) -> &mut [Population<P>] {
        &mut self.populations
    }

    pub fn population(&self, index: usize) -> Option<&Population<P>> {
        self.populations.get(index)
    }

    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    /// Number of entities across all populations.
    pub fn entity_count(&self) -> usize {
        self.populations.iter().map(Population::len).sum()
    }

    /// Best raw fitness across all populations.
    pub fn best_fitness(&self, mode: EvaluationMode) -> Result<f64> {
        let mut best: Option<f64> = None;
        for population in &self.populations {
            let candidate = population.best(FitnessBasis::Raw, mode)?.fitness(FitnessBasis::Raw)?;
            best = Some(match best {
                Some(current) if compare_fitness(current, candidate, mode).is_ge() => current,
                _ => candidate,
            });
        }
        best.ok_or(GeneticError::EmptyPopulation)
    }
}

impl<P: Phenotype> Default for Environment<P> {
    fn default() -> Self {
        Self::empty()
    }
}
