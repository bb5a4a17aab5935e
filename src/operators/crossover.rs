use std::fmt::Debug;

use crate::entity::Entity;
use crate::error::{GeneticError, Result};
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;

use super::validate_rate;

/// Combines a group of parents into children.
pub trait CrossoverOperator<P: Phenotype>: Debug + Send {
    /// Probability that a parent group is actually recombined.
    fn crossover_rate(&self) -> f64;

    /// Number of parents consumed by one crossover.
    fn parent_count(&self) -> usize {
        2
    }

    /// Recombines `parents` unconditionally.
    fn crossover(
        &self,
        parents: &[Entity<P>],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Entity<P>>>;

    /// Produces the children of one parent group.
    ///
    /// With probability [`crossover_rate`](Self::crossover_rate) the parents
    /// are recombined; otherwise they pass through as clones, one generation
    /// older.
    ///
    /// # Errors
    ///
    /// `Operator` if the number of parents does not match
    /// [`parent_count`](Self::parent_count).
    fn generate_offspring(
        &self,
        parents: &[Entity<P>],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Entity<P>>> {
        if parents.len() != self.parent_count() {
            return Err(GeneticError::Operator(format!(
                "Crossover expects {} parents, got {}",
                self.parent_count(),
                parents.len()
            )));
        }

        if rng.chance(self.crossover_rate()) {
            return self.crossover(parents, rng);
        }

        Ok(parents
            .iter()
            .cloned()
            .map(|mut parent| {
                parent.increment_age();
                parent
            })
            .collect())
    }
}

/// Crossover through [`Phenotype::crossover`].
///
/// Two parents `a` and `b` yield two children: `a` crossed with `b`, and `b`
/// crossed with `a`.
///
/// # Examples
///
/// ```
/// use gaengine::operators::{CrossoverOperator, PhenotypeCrossover};
///
/// let crossover = PhenotypeCrossover::new(0.8).unwrap();
/// assert_eq!(CrossoverOperator::<MyPhenotype>::parent_count(&crossover), 2);
/// assert!(PhenotypeCrossover::new(1.5).is_err());
/// # #[derive(Clone, Debug)]
/// # struct MyPhenotype;
/// # impl gaengine::phenotype::Phenotype for MyPhenotype {
/// #     fn crossover(&mut self, _other: &Self) {}
/// #     fn mutate(&mut self, _rng: &mut gaengine::rng::RandomNumberGenerator) {}
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct PhenotypeCrossover {
    crossover_rate: f64,
}

impl PhenotypeCrossover {
    /// # Errors
    ///
    /// `Configuration` if `crossover_rate` is outside `[0, 1]`.
    pub fn new(crossover_rate: f64) -> Result<Self> {
        Ok(Self {
            crossover_rate: validate_rate("Crossover rate", crossover_rate)?,
        })
    }
}

impl Default for PhenotypeCrossover {
    fn default() -> Self {
        Self {
            crossover_rate: 1.0,
        }
    }
}

impl<P: Phenotype> CrossoverOperator<P> for PhenotypeCrossover {
    fn crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    fn crossover(
        &self,
        parents: &[Entity<P>],
        _rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Entity<P>>> {
        let [a, b] = parents else {
            return Err(GeneticError::Operator(format!(
                "Phenotype crossover expects 2 parents, got {}",
                parents.len()
            )));
        };

        let mut first = a.phenotype().clone();
        first.crossover(b.phenotype());
        let mut second = b.phenotype().clone();
        second.crossover(a.phenotype());

        Ok(vec![Entity::new(first), Entity::new(second)])
    }
}
