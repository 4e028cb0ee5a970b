//! # Evolution
//!
//! The scoring contract, run configuration, the per-generation engine, and the
//! launcher that drives generations until the target is matched.

pub mod challenge;
pub mod engine;
pub mod launcher;
pub mod options;
pub mod status;

pub use challenge::{Challenge, TargetDistance};
pub use engine::{GenerationEngine, NextGeneration};
pub use launcher::{EvolutionLauncher, EvolutionResult, EvolutionState};
pub use options::{EvolutionOptions, ExecutionMode};
pub use status::{ConsoleStatus, NoStatus, StatusReporter};
