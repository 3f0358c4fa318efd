//! Lifecycle manager for shutdown coordination.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::info;

/// Broadcasts the shutdown request to every long-running task.
///
/// Tasks subscribe before they start and stop at their next await point
/// once a value (or a closed channel) arrives. A receiver only sees
/// requests sent after it subscribed; [`LifecycleManager::until_shutdown`]
/// also covers requests that came earlier.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    /// Shutdown signal broadcaster.
    pub shutdown_tx: broadcast::Sender<()>,
    stopping: Arc<AtomicBool>,
}

impl LifecycleManager {
    /// Create a new LifecycleManager.
    pub fn new() -> Self {
        // Capacity only needs to hold the single shutdown value
        let (shutdown_tx, _) = broadcast::channel(4);
        Self {
            shutdown_tx,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// New receiver for the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Ask every subscriber to stop. Repeated calls are harmless.
    pub fn shutdown(&self, reason: &str) {
        info!(reason = %reason, "Shutdown requested");
        self.stopping.store(true, Ordering::SeqCst);
        // No receivers means everything has already stopped
        let _ = self.shutdown_tx.send(());
    }

    /// Run `fut` unless shutdown is requested first, including before this
    /// call. Returns `None` when shutdown won.
    pub async fn until_shutdown<F: Future>(&self, fut: F) -> Option<F::Output> {
        // Subscribe before checking the flag so no request slips between.
        let mut shutdown_rx = self.subscribe();
        if self.is_shutting_down() {
            return None;
        }
        tokio::select! {
            _ = shutdown_rx.recv() => None,
            out = fut => Some(out),
        }
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
