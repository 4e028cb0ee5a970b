//! # Generation Engine
//!
//! Turns one population into the next. The aggregate fitness statistics are
//! computed once per generation, then `ceil(N / 2)` parent pairs are selected
//! and bred. In concurrent mode the pair productions are split into one
//! partition per worker; every partition reads the same immutable
//! [`GenerationContext`] and returns its own children, so nothing but the
//! fitness cache is shared between workers.
//!
//! The next population always has exactly the size of the current one: a
//! surplus is truncated, and a deficit (only possible when a concurrent
//! partition is lost) is backfilled with members drawn uniformly from the
//! current population.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    breeding::Breeder,
    error::{GeneticError, Result},
    evolution::{options::ExecutionMode, Challenge},
    genome::Genome,
    pool::WorkerPool,
    rng::RandomNumberGenerator,
    selection::{select_parent, FitnessStats},
};

/// Read-only snapshot shared by every pair production of one generation.
#[derive(Debug)]
pub struct GenerationContext {
    pub population: Vec<Genome>,
    pub stats: FitnessStats,
}

/// The outcome of advancing one generation.
#[derive(Debug, Clone)]
pub struct NextGeneration {
    pub population: Vec<Genome>,
    /// Partitions submitted to the worker pool; zero in sequential mode.
    pub tasks: usize,
    /// Partitions that failed on a worker and succeeded on retry.
    pub recovered_tasks: usize,
    /// Partitions that failed twice; their children were backfilled.
    pub failed_tasks: usize,
}

pub struct GenerationEngine<C: Challenge> {
    challenge: Arc<C>,
    breeder: Breeder,
    pool: Option<WorkerPool>,
}

impl<C> GenerationEngine<C>
where
    C: Challenge + 'static,
{
    /// Creates an engine. Concurrent mode starts its worker pool here.
    pub fn new(challenge: Arc<C>, breeder: Breeder, mode: ExecutionMode) -> Result<Self> {
        let pool = match mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Concurrent { workers } => Some(WorkerPool::new(workers)?),
        };

        Ok(Self {
            challenge,
            breeder,
            pool,
        })
    }

    pub fn challenge(&self) -> &C {
        &self.challenge
    }

    pub fn breeder(&self) -> &Breeder {
        &self.breeder
    }

    pub fn is_concurrent(&self) -> bool {
        self.pool.is_some()
    }

    /// Breeds the population that replaces `population`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPopulation` if `population` is empty.
    pub fn advance(
        &self,
        population: &[Genome],
        rng: &mut RandomNumberGenerator,
    ) -> Result<NextGeneration> {
        let size = population.len();
        let stats = FitnessStats::compute(population, self.challenge.as_ref())?;
        let context = Arc::new(GenerationContext {
            population: population.to_vec(),
            stats,
        });
        let pairs = size.div_ceil(2);

        let mut next = match &self.pool {
            Some(pool) => self.advance_concurrent(pool, &context, pairs, rng),
            None => NextGeneration {
                population: produce_pairs(
                    &context,
                    self.challenge.as_ref(),
                    &self.breeder,
                    pairs,
                    rng,
                )?,
                tasks: 0,
                recovered_tasks: 0,
                failed_tasks: 0,
            },
        };

        next.population.truncate(size);
        let missing = size - next.population.len();
        if missing > 0 {
            debug!(missing, "Backfilling population from the current generation");
        }
        while next.population.len() < size {
            next.population.push(population[rng.gen_index(size)].clone());
        }

        Ok(next)
    }

    fn advance_concurrent(
        &self,
        pool: &WorkerPool,
        context: &Arc<GenerationContext>,
        pairs: usize,
        rng: &mut RandomNumberGenerator,
    ) -> NextGeneration {
        let partitions = partition(pairs, pool.size());

        let tasks: Vec<_> = partitions
            .iter()
            .map(|&count| {
                let context = Arc::clone(context);
                let challenge = Arc::clone(&self.challenge);
                let breeder = self.breeder.clone();
                let mut task_rng = rng.fork();

                pool.submit(move || {
                    produce_pairs(&context, challenge.as_ref(), &breeder, count, &mut task_rng)
                })
            })
            .collect();

        let mut next = NextGeneration {
            population: Vec::with_capacity(pairs * 2),
            tasks: partitions.len(),
            recovered_tasks: 0,
            failed_tasks: 0,
        };

        for (count, result) in partitions.into_iter().zip(WorkerPool::await_all(tasks)) {
            let error = match result.and_then(|children| children) {
                Ok(children) => {
                    next.population.extend(children);
                    continue;
                }
                Err(error) => error,
            };

            warn!(
                pairs = count,
                %error,
                "Generation task failed, retrying on the calling thread"
            );
            match self.retry(context, count, rng) {
                Ok(children) => {
                    next.recovered_tasks += 1;
                    next.population.extend(children);
                }
                Err(error) => {
                    warn!(
                        pairs = count,
                        %error,
                        "Generation task lost, its children will be backfilled"
                    );
                    next.failed_tasks += 1;
                }
            }
        }

        next
    }

    fn retry(
        &self,
        context: &GenerationContext,
        count: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Genome>> {
        let mut retry_rng = rng.fork();

        panic::catch_unwind(AssertUnwindSafe(|| {
            produce_pairs(
                context,
                self.challenge.as_ref(),
                &self.breeder,
                count,
                &mut retry_rng,
            )
        }))
        .unwrap_or_else(|_| Err(GeneticError::Worker("retried task panicked".to_string())))
    }
}

/// Selects `pairs` parent pairs from the context and breeds two children from each.
pub fn produce_pairs<C: Challenge + ?Sized>(
    context: &GenerationContext,
    challenge: &C,
    breeder: &Breeder,
    pairs: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Genome>> {
    let mut children = Vec::with_capacity(pairs * 2);

    for _ in 0..pairs {
        let first = select_parent(&context.population, &context.stats, challenge, rng)?;
        let second = select_parent(&context.population, &context.stats, challenge, rng)?;

        let (a, b) = breeder.create_children(first, second, rng);
        children.push(a);
        children.push(b);
    }

    Ok(children)
}

/// Splits `pairs` into at most `workers` non-empty partitions of near-equal size.
fn partition(pairs: usize, workers: usize) -> Vec<usize> {
    let base = pairs / workers;
    let extra = pairs % workers;

    (0..workers)
        .map(|i| base + usize::from(i < extra))
        .filter(|&count| count > 0)
        .collect()
}
