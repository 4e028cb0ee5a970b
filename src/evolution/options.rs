//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct represents the configuration of one run: the
//! population size, the reproduction probabilities, how generations are
//! executed, how large the fitness cache may grow, and an optional cap on the
//! number of generations.
//!
//! ## Example
//!
//! ```rust
//! use marmoset::evolution::options::{EvolutionOptions, ExecutionMode};
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(50)
//!     .mutation_probability(0.1)
//!     .execution_mode(ExecutionMode::Concurrent { workers: 4 })
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! assert_eq!(options.get_population_size(), 50);
//!
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.get_execution_mode(), ExecutionMode::Sequential);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::caching::DEFAULT_CACHE_CAPACITY;
use crate::error::{GeneticError, Result};

/// Worker count used when concurrent mode is requested without one.
pub const DEFAULT_WORKERS: usize = 2;

/// How the pair productions of a generation are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionMode {
    /// Everything runs on the calling thread.
    Sequential,
    /// Pair productions are split across a fixed-size worker pool.
    Concurrent { workers: usize },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolutionOptions {
    population_size: usize,
    crossover_probability: f64,
    mutation_probability: f64,
    execution_mode: ExecutionMode,
    /// Number of cached scores kept before the fitness cache is cleared
    cache_capacity: usize,
    /// Generations to run before giving up; `None` runs until convergence
    max_generations: Option<usize>,
}

impl EvolutionOptions {
    pub fn new(
        population_size: usize,
        crossover_probability: f64,
        mutation_probability: f64,
        execution_mode: ExecutionMode,
    ) -> Self {
        Self {
            population_size,
            crossover_probability,
            mutation_probability,
            execution_mode,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_generations: None,
        }
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_crossover_probability(&self) -> f64 {
        self.crossover_probability
    }

    pub fn get_mutation_probability(&self) -> f64 {
        self.mutation_probability
    }

    pub fn get_execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    pub fn get_cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub fn get_max_generations(&self) -> Option<usize> {
        self.max_generations
    }

    /// Sets the population size.
    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    /// Sets the execution mode.
    pub fn set_execution_mode(&mut self, execution_mode: ExecutionMode) {
        self.execution_mode = execution_mode;
    }

    /// Sets the generation cap.
    pub fn set_max_generations(&mut self, max_generations: Option<usize>) {
        self.max_generations = max_generations;
    }

    /// Checks that the options describe a runnable configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty population, a probability
    /// outside `[0, 1]`, zero workers, or a zero cache capacity.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }

        for (name, probability) in [
            ("Crossover", self.crossover_probability),
            ("Mutation", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(GeneticError::Configuration(format!(
                    "{} probability must be within [0, 1], got {}",
                    name, probability
                )));
            }
        }

        if let ExecutionMode::Concurrent { workers: 0 } = self.execution_mode {
            return Err(GeneticError::Configuration(
                "Concurrent execution needs at least one worker".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(GeneticError::Configuration(
                "Cache capacity cannot be zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use marmoset::evolution::options::EvolutionOptions;
    ///
    /// let options = EvolutionOptions::builder()
    ///     .population_size(10)
    ///     .crossover_probability(0.85)
    ///     .max_generations(1_000)
    ///     .build();
    /// assert_eq!(options.get_max_generations(), Some(1_000));
    /// ```
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self::new(30, 0.87, 0.25, ExecutionMode::Sequential)
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances.
/// Unset fields take the values of [`EvolutionOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    crossover_probability: Option<f64>,
    mutation_probability: Option<f64>,
    execution_mode: Option<ExecutionMode>,
    cache_capacity: Option<usize>,
    max_generations: Option<usize>,
}

impl EvolutionOptionsBuilder {
    /// Sets the population size.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the probability that a parent pair is crossed over.
    pub fn crossover_probability(mut self, value: f64) -> Self {
        self.crossover_probability = Some(value);
        self
    }

    /// Sets the probability that each child is mutated.
    pub fn mutation_probability(mut self, value: f64) -> Self {
        self.mutation_probability = Some(value);
        self
    }

    pub fn execution_mode(mut self, value: ExecutionMode) -> Self {
        self.execution_mode = Some(value);
        self
    }

    /// Shorthand for concurrent execution with `workers` threads.
    pub fn workers(self, workers: usize) -> Self {
        self.execution_mode(ExecutionMode::Concurrent { workers })
    }

    pub fn cache_capacity(mut self, value: usize) -> Self {
        self.cache_capacity = Some(value);
        self
    }

    pub fn max_generations(mut self, value: usize) -> Self {
        self.max_generations = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let defaults = EvolutionOptions::default();

        EvolutionOptions {
            population_size: self.population_size.unwrap_or(defaults.population_size),
            crossover_probability: self
                .crossover_probability
                .unwrap_or(defaults.crossover_probability),
            mutation_probability: self
                .mutation_probability
                .unwrap_or(defaults.mutation_probability),
            execution_mode: self.execution_mode.unwrap_or(defaults.execution_mode),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            max_generations: self.max_generations.or(defaults.max_generations),
        }
    }
}
