//! # Fitness Caching
//!
//! Wrappers that memoize fitness evaluations. They help with expensive fitness
//! functions, and with strategies that keep re-evaluating unchanged entities
//! (elites, steady-state survivors, clones produced when crossover is skipped).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::error::{GeneticError, Result};
use crate::evaluation::{EvaluationMode, FitnessEvaluator};
use crate::phenotype::Phenotype;

/// A trait for phenotypes that can be used as cache keys.
///
/// Phenotypes that would receive the same fitness score should produce the
/// same key.
pub trait CacheKey: Phenotype {
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    fn cache_key(&self) -> Self::Key;
}

/// Which kind of cache [`CachingEvaluator::with_cache`] builds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheType {
    /// One mutex-guarded map shared by all threads.
    Global,
    /// One map per thread, no locking.
    ThreadLocal,
}

/// A fitness evaluator wrapper backed by a shared, mutex-guarded cache.
#[derive(Debug, Clone)]
pub struct CachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    evaluator: E,
    cache: Arc<Mutex<HashMap<P::Key, f64>>>,
    _marker: PhantomData<P>,
}

impl<P, E> CachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            cache: Arc::new(Mutex::new(HashMap::new())),
            _marker: PhantomData,
        }
    }

    /// Creates a cached evaluator with a pre-populated cache.
    pub fn with_cache(evaluator: E, cache: HashMap<P::Key, f64>) -> Self {
        Self {
            evaluator,
            cache: Arc::new(Mutex::new(cache)),
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &E {
        &self.evaluator
    }

    /// Returns the number of cached fitness evaluations.
    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl<P, E> FitnessEvaluator<P> for CachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    fn evaluation_mode(&self) -> EvaluationMode {
        self.evaluator.evaluation_mode()
    }

    fn evaluate_fitness(&self, phenotype: &P) -> Result<f64> {
        let key = phenotype.cache_key();

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| GeneticError::Evolution("Fitness cache lock poisoned".to_string()))?;

        if let Some(score) = cache.get(&key) {
            return Ok(*score);
        }

        let score = self.evaluator.evaluate_fitness(phenotype)?;
        cache.insert(key, score);

        Ok(score)
    }
}

/// A fitness evaluator wrapper with one cache per thread.
///
/// Entries computed on one rayon worker are invisible to the others, which
/// trades some hit rate for zero lock contention.
#[derive(Debug)]
pub struct ThreadLocalCachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    evaluator: E,
    cache: thread_local::ThreadLocal<RefCell<HashMap<P::Key, f64>>>,
    _marker: PhantomData<P>,
}

impl<P, E> ThreadLocalCachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            cache: thread_local::ThreadLocal::new(),
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &E {
        &self.evaluator
    }

    /// Returns the number of cached evaluations for the current thread.
    pub fn cache_size(&self) -> usize {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .map_or(0, |cache| cache.len())
    }

    /// Clears the cache for the current thread.
    pub fn clear_cache(&self) {
        if let Some(cell) = self.cache.get() {
            if let Ok(mut cache) = cell.try_borrow_mut() {
                cache.clear();
            }
        }
    }
}

impl<P, E> FitnessEvaluator<P> for ThreadLocalCachedEvaluator<P, E>
where
    P: CacheKey,
    E: FitnessEvaluator<P>,
{
    fn evaluation_mode(&self) -> EvaluationMode {
        self.evaluator.evaluation_mode()
    }

    fn evaluate_fitness(&self, phenotype: &P) -> Result<f64> {
        let key = phenotype.cache_key();
        let cell = self.cache.get_or(|| RefCell::new(HashMap::new()));

        if let Some(score) = cell.borrow().get(&key) {
            return Ok(*score);
        }

        let score = self.evaluator.evaluate_fitness(phenotype)?;
        cell.borrow_mut().insert(key, score);

        Ok(score)
    }
}

/// Extension trait for wrapping an evaluator with caching.
pub trait CachingEvaluator<P: CacheKey + 'static>: FitnessEvaluator<P> + Sized + 'static {
    fn with_global_cache(self) -> CachedEvaluator<P, Self> {
        CachedEvaluator::new(self)
    }

    fn with_thread_local_cache(self) -> ThreadLocalCachedEvaluator<P, Self> {
        ThreadLocalCachedEvaluator::new(self)
    }

    /// Wraps the evaluator in the cache selected by `cache_type`.
    fn with_cache(self, cache_type: CacheType) -> Box<dyn FitnessEvaluator<P>> {
        match cache_type {
            CacheType::Global => Box::new(self.with_global_cache()),
            CacheType::ThreadLocal => Box::new(self.with_thread_local_cache()),
        }
    }
}

impl<P, E> CachingEvaluator<P> for E
where
    P: CacheKey + 'static,
    E: FitnessEvaluator<P> + 'static,
{
}
