// pool.rs
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

/// Bounded pool of request workers.
///
/// Every RPC holds one permit for as long as it runs. Unary calls give it
/// back as soon as they respond. A monitor stream keeps its permit until the
/// stream ends, so at most `size` streams can be open at once and, while that
/// many are open, every other call waits for a permit. Size the pool for the
/// expected number of concurrent monitors plus headroom for unary traffic.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

/// A held worker slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct Worker {
    _permit: OwnedSemaphorePermit,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a free worker.
    pub async fn acquire(&self, method: &'static str) -> AppResult<Worker> {
        if self.permits.available_permits() == 0 {
            warn!(method, size = self.size, "Worker pool exhausted, call is waiting");
        }
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AppError::Internal("worker pool is closed".into()))?;
        Ok(Worker { _permit: permit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn dropping_a_worker_frees_its_slot() {
        let pool = WorkerPool::new(2);
        let a = pool.acquire("test").await.unwrap();
        let _b = pool.acquire("test").await.unwrap();
        assert_eq!(pool.available(), 0);
        drop(a);
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_pool_makes_callers_wait() {
        let pool = WorkerPool::new(1);
        let held = pool.acquire("monitor").await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_secs(5), pool.acquire("list")).await;
        assert!(waiting.is_err());

        drop(held);
        assert!(pool.acquire("list").await.is_ok());
    }

    #[test]
    fn zero_size_is_raised_to_one() {
        assert_eq!(WorkerPool::new(0).size(), 1);
    }
}
