//! # Fitness Evaluation
//!
//! The [`FitnessEvaluator`] trait scores phenotypes. The generation loop calls
//! [`evaluate_entities`] as a strict barrier: every pending entity of a
//! generation is scored before scaling, elitism or selection begin. Large
//! batches are scored on rayon's thread pool.

pub mod caching;

pub use caching::{CacheKey, CacheType, CachedEvaluator, CachingEvaluator, ThreadLocalCachedEvaluator};

use rayon::prelude::*;

use crate::entity::Entity;
use crate::error::{GeneticError, Result};
use crate::phenotype::Phenotype;

/// Whether larger or smaller fitness values are better.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    #[default]
    Maximize,
    Minimize,
}

/// Scores phenotypes.
///
/// Evaluators must be `Send + Sync` because large generations are scored in
/// parallel and the algorithm runs on the controller's worker thread.
///
/// # Examples
///
/// ```
/// use gaengine::evaluation::{EvaluationMode, FitnessEvaluator};
/// use gaengine::error::Result;
/// use gaengine::phenotype::Phenotype;
/// use gaengine::rng::RandomNumberGenerator;
///
/// #[derive(Clone, Debug)]
/// struct XCoordinate { x: f64 }
///
/// impl Phenotype for XCoordinate {
///     fn crossover(&mut self, other: &Self) { self.x = (self.x + other.x) / 2.0; }
///     fn mutate(&mut self, rng: &mut RandomNumberGenerator) { self.x += rng.gen_range_f64(-1.0, 1.0); }
/// }
///
/// struct DistanceToTarget { target: f64 }
///
/// impl FitnessEvaluator<XCoordinate> for DistanceToTarget {
///     fn evaluation_mode(&self) -> EvaluationMode {
///         EvaluationMode::Minimize
///     }
///
///     fn evaluate_fitness(&self, phenotype: &XCoordinate) -> Result<f64> {
///         Ok((phenotype.x - self.target).abs())
///     }
/// }
///
/// let evaluator = DistanceToTarget { target: 2.0 };
/// assert_eq!(evaluator.evaluate_fitness(&XCoordinate { x: 5.0 }).unwrap(), 3.0);
/// ```
pub trait FitnessEvaluator<P: Phenotype>: Send + Sync {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    /// Computes the raw fitness of a phenotype.
    fn evaluate_fitness(&self, phenotype: &P) -> Result<f64>;
}

impl<P: Phenotype, E: FitnessEvaluator<P> + ?Sized> FitnessEvaluator<P> for Box<E> {
    fn evaluation_mode(&self) -> EvaluationMode {
        (**self).evaluation_mode()
    }

    fn evaluate_fitness(&self, phenotype: &P) -> Result<f64> {
        (**self).evaluate_fitness(phenotype)
    }
}

/// Evaluates every entity that has not yet been evaluated in `generation`.
///
/// Entities whose raw fitness was already computed for this generation (for
/// instance steady-state children) are skipped, so raw fitness is set exactly
/// once per generation.
///
/// # Errors
///
/// Propagates evaluator errors unchanged and reports non-finite scores as
/// `FitnessCalculation`.
pub fn evaluate_entities<P: Phenotype>(
    entities: &mut [Entity<P>],
    evaluator: &dyn FitnessEvaluator<P>,
    generation: usize,
    parallel_threshold: usize,
) -> Result<usize> {
    let pending = entities
        .iter()
        .filter(|entity| !entity.is_evaluated_in(generation))
        .count();

    if pending == 0 {
        return Ok(0);
    }

    if pending >= parallel_threshold {
        entities
            .par_iter_mut()
            .filter(|entity| !entity.is_evaluated_in(generation))
            .try_for_each(|entity| evaluate_entity(entity, evaluator, generation))?;
    } else {
        entities
            .iter_mut()
            .filter(|entity| !entity.is_evaluated_in(generation))
            .try_for_each(|entity| evaluate_entity(entity, evaluator, generation))?;
    }

    Ok(pending)
}

fn evaluate_entity<P: Phenotype>(
    entity: &mut Entity<P>,
    evaluator: &dyn FitnessEvaluator<P>,
    generation: usize,
) -> Result<()> {
    let score = evaluator.evaluate_fitness(entity.phenotype())?;

    if !score.is_finite() {
        return Err(GeneticError::FitnessCalculation(format!(
            "Non-finite fitness score {} for entity {}",
            score,
            entity.representation()
        )));
    }

    entity.set_raw_fitness(score, generation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct TestPhenotype {
        value: f64,
    }

    impl Phenotype for TestPhenotype {
        fn crossover(&mut self, other: &Self) {
            self.value = (self.value + other.value) / 2.0;
        }

        fn mutate(&mut self, _rng: &mut RandomNumberGenerator) {
            self.value += 0.1;
        }
    }

    struct CountingEvaluator {
        calls: AtomicUsize,
    }

    impl FitnessEvaluator<TestPhenotype> for CountingEvaluator {
        fn evaluate_fitness(&self, phenotype: &TestPhenotype) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(phenotype.value * 10.0)
        }
    }

    struct BrokenEvaluator;

    impl FitnessEvaluator<TestPhenotype> for BrokenEvaluator {
        fn evaluate_fitness(&self, _phenotype: &TestPhenotype) -> Result<f64> {
            Ok(f64::INFINITY)
        }
    }

    fn entities(count: usize) -> Vec<Entity<TestPhenotype>> {
        (0..count)
            .map(|i| Entity::new(TestPhenotype { value: i as f64 }))
            .collect()
    }

    #[test]
    fn test_evaluates_pending_entities_once() {
        let evaluator = CountingEvaluator {
            calls: AtomicUsize::new(0),
        };
        let mut entities = entities(5);

        let evaluated = evaluate_entities(&mut entities, &evaluator, 0, 1000).unwrap();
        assert_eq!(evaluated, 5);
        assert_eq!(entities[3].raw_fitness(), Some(30.0));

        let evaluated = evaluate_entities(&mut entities, &evaluator, 0, 1000).unwrap();
        assert_eq!(evaluated, 0);
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 5);

        let evaluated = evaluate_entities(&mut entities, &evaluator, 1, 1000).unwrap();
        assert_eq!(evaluated, 5);
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let evaluator = CountingEvaluator {
            calls: AtomicUsize::new(0),
        };
        let mut parallel = entities(64);
        let mut sequential = entities(64);

        evaluate_entities(&mut parallel, &evaluator, 0, 1).unwrap();
        evaluate_entities(&mut sequential, &evaluator, 0, 1000).unwrap();

        let a: Vec<_> = parallel.iter().map(|e| e.raw_fitness()).collect();
        let b: Vec<_> = sequential.iter().map(|e| e.raw_fitness()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_score_is_rejected() {
        let mut entities = entities(2);
        let result = evaluate_entities(&mut entities, &BrokenEvaluator, 0, 1000);
        assert!(matches!(result, Err(GeneticError::FitnessCalculation(_))));
    }
}
