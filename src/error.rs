//! # Error Types
//!
//! This module defines the error type shared by every part of the engine.
//! Configuration problems are reported when a run is created, never mid-run.
//! Broken invariants (a genome whose length differs from the target, for
//! example) are programming errors and panic instead of producing a variant
//! here.
//!
//! ## Examples
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use marmoset::error::{GeneticError, OptionExt};
//!
//! fn first_genome(candidates: &[String]) -> marmoset::error::Result<&String> {
//!     candidates.first().ok_or_else_genetic(|| GeneticError::EmptyPopulation)
//! }
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use marmoset::error::{Result, ResultExt};
//!
//! fn parse_workers(raw: &str) -> Result<usize> {
//!     raw.parse::<usize>().context("Invalid worker count")
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while evolving a population.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when an evolution process is driven incorrectly.
    #[error("Evolution error: {0}")]
    Evolution(String),

    /// Error that occurs when a task running on the worker pool panics or is lost.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Error that occurs when the configured generation cap is reached.
    #[error("Maximum attempts reached: {0}")]
    MaxAttemptsReached(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for evolution operations.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use marmoset::error::ResultExt;
///
/// fn seed(raw: &str) -> marmoset::error::Result<u64> {
///     raw.parse::<u64>().context("Invalid seed")
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Adds context to an error, converting it to `GeneticError::Other`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using
    /// a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
