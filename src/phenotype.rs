//! # Phenotype Trait
//!
//! The `Phenotype` trait is the boundary between the engine and a concrete
//! solution representation (bit strings, integer lists, trees, ...). The engine
//! never looks inside a phenotype; it wraps it in an [`Entity`](crate::entity::Entity)
//! that carries fitness and bookkeeping, and invokes the two variation hooks
//! defined here through [`PhenotypeCrossover`](crate::operators::PhenotypeCrossover)
//! and [`PhenotypeMutation`](crate::operators::PhenotypeMutation).
//!
//! ## Example
//!
//! ```rust
//! use gaengine::phenotype::Phenotype;
//! use gaengine::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug)]
//! struct XCoordinate {
//!     x: f64,
//! }
//!
//! impl Phenotype for XCoordinate {
//!     fn crossover(&mut self, other: &Self) {
//!         self.x = (self.x + other.x) / 2.0;
//!     }
//!
//!     fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
//!         self.x += rng.gen_range_f64(-1.0, 1.0);
//!     }
//! }
//!
//! let mut a = XCoordinate { x: 1.0 };
//! a.crossover(&XCoordinate { x: 3.0 });
//! assert_eq!(a.x, 2.0);
//! assert_eq!(a.representation(), "XCoordinate { x: 2.0 }");
//! ```

use std::fmt::Debug;

use crate::rng::RandomNumberGenerator;

/// Trait for types that represent candidate solutions.
///
/// Types implementing this trait must also implement `Clone`, `Debug`, `Send`
/// and `Sync` so entities can be cloned for variation, evaluated on rayon's
/// pool and moved onto the controller's worker thread.
pub trait Phenotype: Clone + Debug + Send + Sync {
    /// Combines the genetic material of `other` into `self`.
    fn crossover(&mut self, other: &Self);

    /// Introduces a random change using the provided random number generator.
    fn mutate(&mut self, rng: &mut RandomNumberGenerator);

    /// Display form of the phenotype.
    ///
    /// The engine caches the result on the owning entity until the phenotype
    /// changes, so this may be moderately expensive.
    fn representation(&self) -> String {
        format!("{:?}", self)
    }
}
