//! Bounded task pools.
//!
//! Each pool hands out semaphore permits; a spawned task holds its permit
//! until it finishes. Callers pick the saturation policy: shed with
//! [`WorkerPool::try_spawn`] or wait with [`WorkerPool::spawn`].

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// A named, fixed-size pool of task permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    /// Number of tasks currently holding a permit.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.size - self.permits.available_permits()
    }

    /// Spawn `task` if a permit is free. Returns `false` (and logs) when the
    /// pool is saturated or closed; the task is dropped unrun.
    pub fn try_spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => {
                tokio::spawn(async move {
                    let _permit = permit;
                    task.await;
                });
                true
            }
            Err(_) => {
                warn!(pool = self.name, size = self.size, "Worker pool saturated, dropping task");
                false
            }
        }
    }

    /// Spawn `task`, waiting for a permit first.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            warn!(pool = self.name, "Worker pool closed, dropping task");
            return;
        };
        tokio::spawn(async move {
            let _permit = permit;
            task.await;
        });
    }

    /// Wait for every running task to finish, then stop accepting new ones.
    pub async fn drain(&self) {
        let permits = u32::try_from(self.size).unwrap_or(u32::MAX);
        if let Ok(all) = self.permits.acquire_many(permits).await {
            all.forget();
        }
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn saturated_pool_sheds() {
        let pool = WorkerPool::new("test", 1);
        let (release_tx, release_rx) = oneshot::channel::<()>();

        assert!(pool.try_spawn(async move {
            let _ = release_rx.await;
        }));
        assert_eq!(pool.in_flight(), 1);
        assert!(!pool.try_spawn(async {}));

        release_tx.send(()).unwrap();
        pool.drain().await;
        assert!(!pool.try_spawn(async {}));
    }

    #[tokio::test]
    async fn spawn_waits_for_permit_and_drain_waits_for_tasks() {
        let pool = WorkerPool::new("test", 2);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let done = Arc::clone(&done);
            pool.spawn(async move {
                tokio::task::yield_now().await;
                done.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }

        pool.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 5);
    }
}
