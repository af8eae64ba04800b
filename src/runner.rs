use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Fixed-size worker pool shared by every pass of a run.
///
/// Each call to [`ChunkRunner::run`] is one synchronous fan-out/fan-in: the
/// chunk function runs once per chunk, and results come back in chunk order
/// after all workers finish. A panic inside the chunk function is re-raised
/// on the calling thread.
pub struct ChunkRunner {
    pool: ThreadPool,
    workers: usize,
}

impl ChunkRunner {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            bail!("Worker count must be at least 1");
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tweetsieve-worker-{}", i))
            .build()
            .context("Failed to build worker pool")?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run<T, R, F>(&self, chunks: &[&[T]], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> R + Sync,
    {
        debug!(chunks = chunks.len(), workers = self.workers, "Dispatching pass");
        self.pool
            .install(|| chunks.par_iter().map(|chunk| f(chunk)).collect())
    }
}
