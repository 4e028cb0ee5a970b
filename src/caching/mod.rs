//! # Caching Module
//!
//! This module provides a memoizing wrapper for fitness evaluations. Parent
//! selection scores every member of the population many times per generation,
//! so repeated lookups are served from a shared map instead of recomputed.
//!
//! The cache is bounded: once it holds `capacity` entries, it is cleared
//! wholesale before the next insert, so it never holds more than `capacity`.
//! Scores are cheap to recompute, so a full clear is preferred over tracking
//! recency.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::evolution::Challenge;
use crate::genome::Genome;

/// Default number of cached scores kept before the cache is cleared.
pub const DEFAULT_CACHE_CAPACITY: usize = 200_000;

/// A wrapper around a challenge that caches fitness evaluations.
///
/// Clones share the same cache, so a clone handed to worker threads keeps
/// feeding the cache the driver reads from.
#[derive(Debug, Clone)]
pub struct CachedChallenge<C>
where
    C: Challenge,
{
    /// The wrapped challenge
    challenge: C,
    /// The cache of fitness evaluations
    cache: Arc<Mutex<HashMap<Genome, f64>>>,
    /// Entry count at which the cache is cleared before the next insert
    capacity: usize,
}

impl<C> CachedChallenge<C>
where
    C: Challenge,
{
    /// Creates a new cached challenge with the default capacity.
    pub fn new(challenge: C) -> Self {
        Self::with_capacity(challenge, DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a new cached challenge that clears itself after `capacity` entries.
    pub fn with_capacity(challenge: C, capacity: usize) -> Self {
        Self {
            challenge,
            cache: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    /// Returns a reference to the wrapped challenge.
    pub fn inner(&self) -> &C {
        &self.challenge
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached fitness evaluations.
    pub fn cache_size(&self) -> usize {
        self.lock().len()
    }

    /// Clears the cache.
    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    // A worker that panicked while holding the lock leaves the map intact, so
    // poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<Genome, f64>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Challenge for CachedChallenge<C>
where
    C: Challenge,
{
    fn score(&self, genome: &Genome) -> f64 {
        if let Some(score) = self.lock().get(genome) {
            return *score;
        }

        // Computed outside the lock; two threads may race on the same key,
        // which only costs a duplicate computation of the same value.
        let score = self.challenge.score(genome);

        let mut cache = self.lock();
        if cache.len() >= self.capacity {
            debug!(entries = cache.len(), "Fitness cache full, clearing");
            cache.clear();
        }
        cache.insert(genome.clone(), score);

        score
    }
}
