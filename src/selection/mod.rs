pub mod boltzmann;
pub mod rank;
pub mod roulette;
pub mod selection_strategy;
pub mod tournament;
pub mod uniform;

pub use boltzmann::{
    AnnealingSchedule, BoltzmannSelection, ExponentialAnnealing, FixedTemperature,
    LinearAnnealing,
};
pub use rank::RankSelection;
pub use roulette::{FitnessProportionateSelection, RouletteWheelSampler};
pub use selection_strategy::SelectionOperator;
pub use tournament::TournamentSelection;
pub use uniform::UniformSelection;
