//! Rayon thread pool configuration for trial batches.
//!
//! Use [WorkerPool::install] to run a parallel batch with a fixed number of threads, or
//! rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

use crate::error::SimulationError;

/// Environment variable read by the CLI when `--workers` is absent.
pub const WORKERS_ENV_VAR: &str = "STARFORCE_WORKERS";

/// Configures how many worker threads run trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run `f` on a pool of this size. With 0 workers the global Rayon pool is used;
    /// otherwise a temporary pool is built.
    pub fn install<F, R>(&self, f: F) -> Result<R, SimulationError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return Ok(f());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|err| SimulationError::WorkerPool(err.to_string()))?;
        Ok(pool.install(f))
    }
}
