pub mod algorithm;
pub mod builder;
pub mod controller;
pub mod observer;
pub mod options;

pub use algorithm::GeneticAlgorithm;
pub use builder::GeneticAlgorithmBuilder;
pub use controller::{ExecutionContext, ExecutionController, ExecutionState};
pub use observer::{AlgorithmEvent, AlgorithmObserver, EventChannelObserver, RunControl};
pub use options::{AlgorithmOptions, AlgorithmOptionsBuilder};
