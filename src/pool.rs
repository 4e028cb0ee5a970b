//! # Worker Pool
//!
//! A fixed-size pool of named threads for running independent tasks. Tasks are
//! submitted one at a time and yield a [`Task`] handle; [`WorkerPool::await_all`]
//! blocks until every handle has produced a result.
//!
//! A panic inside a task is caught on the worker and reported as
//! [`GeneticError::Worker`], so a failing task can never leave a caller waiting.
//!
//! ```rust
//! use marmoset::pool::WorkerPool;
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let tasks: Vec<_> = (0..4).map(|i| pool.submit(move || i * 10)).collect();
//!
//! let results: Vec<usize> = WorkerPool::await_all(tasks)
//!     .into_iter()
//!     .map(|result| result.unwrap())
//!     .collect();
//! assert_eq!(results, vec![0, 10, 20, 30]);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use tracing::debug;

use crate::error::{GeneticError, Result};

/// Prefix of every worker thread name.
pub const WORKER_THREAD_PREFIX: &str = "marmoset-worker";

/// A fixed-size pool of worker threads.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

/// Handle to the eventual result of a submitted task.
#[derive(Debug)]
pub struct Task<T> {
    receiver: mpsc::Receiver<Result<T>>,
}

impl WorkerPool {
    /// Builds a pool with `size` threads.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `size` is zero or the threads cannot be
    /// started.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(GeneticError::Configuration(
                "Worker pool needs at least one worker".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|index| format!("{}-{}", WORKER_THREAD_PREFIX, index))
            .build()
            .map_err(|e| {
                GeneticError::Configuration(format!("Failed to start worker pool: {}", e))
            })?;

        debug!(workers = size, "Worker pool started");

        Ok(Self { pool, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `task` on the pool.
    pub fn submit<T, F>(&self, task: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();

        self.pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task))
                .map_err(|payload| GeneticError::Worker(panic_message(payload.as_ref())));
            // The receiver may already be gone; nobody is left to tell.
            let _ = sender.send(result);
        });

        Task { receiver }
    }

    /// Waits for every task and returns the results in submission order.
    pub fn await_all<T>(tasks: Vec<Task<T>>) -> Vec<Result<T>> {
        tasks.into_iter().map(Task::wait).collect()
    }
}

impl<T> Task<T> {
    /// Blocks until the task finishes.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(GeneticError::Worker(
                "Task was dropped before producing a result".to_string(),
            ))
        })
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool").field("size", &self.size).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("task panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("task panicked: {}", message)
    } else {
        "task panicked".to_string()
    }
}
