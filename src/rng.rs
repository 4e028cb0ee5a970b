//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct is the single source of randomness for a
//! run. Everything else draws through it, so a run seeded with
//! [`RandomNumberGenerator::from_seed`] is reproducible, including concurrent
//! runs, whose partitions each receive a [`fork`](RandomNumberGenerator::fork).
//!
//! ## Example
//!
//! ```rust
//! use marmoset::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let index = rng.gen_index(10);
//! let float = rng.gen_float();
//!
//! assert!(index < 10);
//! assert!((0.0..1.0).contains(&float));
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Number of distinct values `gen_float` can produce, one per representable
/// `f64` step in `[0, 1)`.
const FLOAT_RESOLUTION: u64 = 1 << 53;

/// A wrapper around the `rand` crate's `StdRng` exposing the draws the engine
/// needs: uniform integers below a bound, uniform floats derived from them, and
/// Bernoulli trials.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives an independent generator from this one.
    ///
    /// The child is seeded from the parent's stream, so forking is itself
    /// deterministic under a seeded parent.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }

    /// Draws a uniform integer from `[0, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `upper` is zero.
    pub fn gen_index(&mut self, upper: usize) -> usize {
        assert!(upper > 0, "cannot draw an index below zero");
        self.rng.gen_range(0..upper)
    }

    /// Draws a uniform float from `[0, 1)`.
    pub fn gen_float(&mut self) -> f64 {
        self.rng.gen_range(0..FLOAT_RESOLUTION) as f64 / FLOAT_RESOLUTION as f64
    }

    /// Returns `true` with the given probability.
    ///
    /// A probability of `0.0` never succeeds and `1.0` always does.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.gen_float() < probability
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
