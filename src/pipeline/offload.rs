//! Bounded offload of CPU-bound work
//!
//! Clustering, tree building and sentence scoring never suspend, so they run
//! on tokio's blocking threads. A semaphore caps how many of them run at
//! once; callers wait for a permit instead of piling up threads.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Semaphore-bounded wrapper around [`tokio::task::spawn_blocking`]
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl BlockingPool {
    /// Pool running at most `max_jobs` jobs concurrently (at least one)
    pub fn new(max_jobs: usize) -> Self {
        let capacity = max_jobs.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running job
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Refuse new jobs; jobs already running finish normally
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Run `job` on a blocking thread once a permit is free
    ///
    /// The permit moves into the job and is released when it returns, even
    /// if the awaiting future was dropped in the meantime.
    pub async fn run<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolClosed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| Error::Worker(e.to_string()))
    }
}

impl Default for BlockingPool {
    fn default() -> Self {
        Self::new(crate::pipeline::config::DEFAULT_MAX_BLOCKING_JOBS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_returns_job_output() {
        let pool = BlockingPool::new(2);
        let out = pool.run(|| 21 * 2).await.unwrap();
        assert_eq!(out, 42);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let pool = BlockingPool::new(0);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.run(|| "ok").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_jobs() {
        let pool = BlockingPool::new(1);
        pool.close();
        assert!(pool.is_closed());
        assert!(matches!(pool.run(|| ()).await, Err(Error::PoolClosed)));
    }

    #[tokio::test]
    async fn test_panicking_job_is_worker_error() {
        let pool = BlockingPool::new(1);
        let result: Result<()> = pool.run(|| panic!("boom")).await;
        assert!(matches!(result, Err(Error::Worker(_))));
        // The permit comes back after the panic
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let pool = BlockingPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|_| {
            let pool = pool.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                pool.run(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            })
        });

        for job in jobs.collect::<Vec<_>>() {
            job.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.available(), 2);
    }
}
