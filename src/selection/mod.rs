pub mod roulette;

pub use roulette::{select_parent, FitnessStats};
