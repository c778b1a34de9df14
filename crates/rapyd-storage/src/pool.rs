//! Bounded worker pool for thumbnail generation and archive building.
//!
//! At most `size` jobs run at once. Waiting jobs are admitted in FIFO order,
//! which is what the underlying tokio semaphore guarantees.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

/// A fixed-size pool of execution permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    limiter: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool admitting `size` concurrent jobs (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            limiter: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Configured number of concurrent jobs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running job.
    pub fn available(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Run an async job once a permit is free.
    pub async fn execute<F, Fut, T>(&self, job: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| AppError::internal("Worker pool closed"))?;
        job().await
    }

    /// Run a blocking job on the blocking thread pool once a permit is free.
    ///
    /// The permit moves into the blocking task, so a caller that stops
    /// waiting does not free the slot while the job is still running.
    pub async fn run_blocking<F, T>(&self, job: F) -> AppResult<T>
    where
        F: FnOnce() -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("Worker pool closed"))?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Worker task panicked", e))?
    }
}
