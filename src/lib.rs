pub mod alphabet;
pub mod breeding;
pub mod caching;
pub mod error;
pub mod evolution;
pub mod genome;
pub mod pool;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result, ResultExt};
