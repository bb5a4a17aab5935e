use crate::entity::{compare_fitness, Entity, FitnessBasis};
use crate::error::{GeneticError, Result};
use crate::evaluation::EvaluationMode;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::{selection_values, SelectionOperator};

/// A selection operator that runs a tournament for every pick.
///
/// `tournament_size` entities are drawn uniformly (with replacement) and the
/// fittest of them wins. Larger tournaments mean stronger selection pressure;
/// a tournament size of 1 is equivalent to uniform selection.
///
/// # Examples
///
/// ```
/// use gaengine::selection::TournamentSelection;
///
/// let selection = TournamentSelection::new(3).unwrap();
/// assert_eq!(selection.tournament_size(), 3);
/// assert!(TournamentSelection::new(0).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    tournament_size: usize,
    basis: FitnessBasis,
}

impl TournamentSelection {
    /// Creates a new tournament selection.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(GeneticError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            tournament_size,
            basis: FitnessBasis::Scaled,
        })
    }

    pub fn with_tournament_size(mut self, tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(GeneticError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        self.tournament_size = tournament_size;
        Ok(self)
    }

    pub fn with_basis(mut self, basis: FitnessBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament over `fitness` and returns the index of the winner.
    fn run_tournament(
        &self,
        fitness: &[f64],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> usize {
        let mut best_idx = rng.gen_index(fitness.len());

        for _ in 1..self.tournament_size {
            let idx = rng.gen_index(fitness.len());
            if compare_fitness(fitness[idx], fitness[best_idx], mode).is_gt() {
                best_idx = idx;
            }
        }

        best_idx
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self {
            tournament_size: 2,
            basis: FitnessBasis::Scaled,
        }
    }
}

impl<P: Phenotype> SelectionOperator<P> for TournamentSelection {
    fn selection_basis(&self) -> FitnessBasis {
        self.basis
    }

    fn select_index(
        &self,
        entities: &[Entity<P>],
        mode: EvaluationMode,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let fitness = selection_values(entities, self.basis)?;
        Ok(self.run_tournament(&fitness, mode, rng))
    }
}
