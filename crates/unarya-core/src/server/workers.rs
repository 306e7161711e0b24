//! Bounded pool of blocking workers.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::error;

/// Worker pool failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The pool or the blocking runtime is shut down.
    #[error("Worker pool is closed")]
    Closed,

    /// The job panicked on its worker.
    #[error("Worker panicked: {0}")]
    Panicked(String),
}

/// Runs synchronous jobs on blocking threads, at most `size` at a time.
///
/// Each job holds a permit for its whole run; jobs beyond `size` wait for
/// a permit before they start.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool of `size` workers. A size of 0 is raised to 1.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self { permits: Arc::new(Semaphore::new(size)), size }
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Workers not currently running a job.
    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs `job` on a worker and returns its output.
    pub async fn execute<F, T>(&self, job: F) -> Result<T, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits).acquire_owned().await.map_err(|_| WorkerError::Closed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Worker job failed");
            if e.is_panic() { WorkerError::Panicked(e.to_string()) } else { WorkerError::Closed }
        })
    }
}
