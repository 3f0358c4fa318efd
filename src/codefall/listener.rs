//! Notification listener loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::{Notification, NotificationSource};
use crate::db::{Code, EntryStore};
use crate::workers::WorkerPool;

/// Turns store notifications into queued [`Code`]s.
///
/// Waits for either the next notification or `idle` to elapse. A quiet
/// window triggers exactly one keepalive ping before waiting again.
pub struct NotificationListener<S> {
    source: S,
    resolver: Resolver,
    idle: Duration,
}

/// Looks up notified keys on the worker pool.
struct Resolver {
    store: Arc<dyn EntryStore>,
    workers: WorkerPool,
    announce_tx: mpsc::Sender<Code>,
    channel: String,
}

impl<S: NotificationSource> NotificationListener<S> {
    pub fn new(
        source: S,
        store: Arc<dyn EntryStore>,
        workers: WorkerPool,
        announce_tx: mpsc::Sender<Code>,
        channel: impl Into<String>,
        idle: Duration,
    ) -> Self {
        Self {
            source,
            resolver: Resolver {
                store,
                workers,
                announce_tx,
                channel: channel.into(),
            },
            idle,
        }
    }

    /// Run until shutdown or until the source is gone, then wait for
    /// in-flight lookups. The announcement queue closes when this returns.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let Self {
            mut source,
            resolver,
            idle,
        } = self;
        let channel = resolver.channel.clone();
        info!(channel = %channel, idle = ?idle, "Notification listener started");

        loop {
            let event = tokio::select! {
                _ = shutdown_rx.recv() => break,
                event = tokio::time::timeout(idle, source.recv()) => event,
            };

            match event {
                Ok(Some(notification)) => resolver.handle(notification).await,
                Ok(None) => {
                    warn!(channel = %channel, "Notification source closed");
                    break;
                }
                Err(_) => {
                    debug!(channel = %channel, "No notification received, pinging listener");
                    source.ping();
                }
            }
        }

        resolver.workers.drain().await;
        info!(channel = %channel, "Notification listener stopped");
    }
}

impl Resolver {
    async fn handle(&self, notification: Notification) {
        if notification.channel != self.channel || notification.payload.is_empty() {
            return;
        }

        info!(channel = %notification.channel, "Got notification");

        let store = Arc::clone(&self.store);
        let announce_tx = self.announce_tx.clone();
        let key = notification.payload;
        self.workers
            .spawn(async move {
                let Some(code) = store.fetch_by_key(&key).await else {
                    debug!(key = %key, "Notified key has no unclaimed entry");
                    return;
                };
                if announce_tx.send(code).await.is_err() {
                    warn!("Announcement queue closed, dropping entry");
                }
            })
            .await;
    }
}
