//! `LISTEN` subscription backed by [`PgListener`].

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::DbError;
use crate::codefall::{Notification, NotificationSource};

/// Upper bound on a single keepalive round trip.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Exponential retry delay, doubling from `min` up to `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub const MIN: Duration = Duration::from_secs(1);
    pub const MAX: Duration = Duration::from_secs(60);

    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Delay to wait now; doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::MIN, Self::MAX)
    }
}

/// Notifications buffered between the pump task and the listener loop.
const NOTIFY_BUFFER: usize = 64;

/// The connection a [`PgNotificationSource`] pumps notifications from.
#[async_trait]
pub(crate) trait Subscription: Send + 'static {
    /// Next notification. Must be cancel-safe.
    async fn next_notification(&mut self) -> Result<Notification, sqlx::Error>;

    /// One round trip on the subscribed connection.
    async fn keepalive(&mut self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl Subscription for PgListener {
    async fn next_notification(&mut self) -> Result<Notification, sqlx::Error> {
        let notification = self.recv().await?;
        Ok(Notification {
            channel: notification.channel().to_string(),
            payload: notification.payload().to_string(),
        })
    }

    async fn keepalive(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&mut *self).await?;
        Ok(())
    }
}

/// Notification source for one Postgres channel.
///
/// A pump task owns the [`PgListener`] and answers keepalive requests
/// between notifications, so neither `recv` nor `ping` ever waits on a
/// round trip. `PgListener` reconnects and re-issues `LISTEN` on the next
/// receive after a lost connection; failures in between are retried with
/// backoff.
pub struct PgNotificationSource {
    notifications: mpsc::Receiver<Notification>,
    pings: mpsc::Sender<()>,
    pump: JoinHandle<()>,
}

impl PgNotificationSource {
    /// Open a dedicated connection and `LISTEN` on `channel`.
    pub async fn listen(pool: &PgPool, channel: &str) -> Result<Self, DbError> {
        let listen_err = |source| DbError::Listen {
            channel: channel.to_string(),
            source,
        };

        let mut listener = PgListener::connect_with(pool).await.map_err(listen_err)?;
        listener.listen(channel).await.map_err(listen_err)?;

        info!(channel = %channel, "Listening for notifications");

        Ok(Self::spawn(listener, channel))
    }

    pub(crate) fn spawn<C: Subscription>(conn: C, channel: &str) -> Self {
        let (notify_tx, notifications) = mpsc::channel(NOTIFY_BUFFER);
        // One pending keepalive is enough; further requests coalesce.
        let (pings, ping_rx) = mpsc::channel(1);
        let pump = tokio::spawn(pump(conn, channel.to_string(), notify_tx, ping_rx));
        Self {
            notifications,
            pings,
            pump,
        }
    }
}

impl Drop for PgNotificationSource {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[async_trait]
impl NotificationSource for PgNotificationSource {
    async fn recv(&mut self) -> Option<Notification> {
        self.notifications.recv().await
    }

    fn ping(&self) {
        match self.pings.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => debug!("Keepalive already pending"),
            Err(TrySendError::Closed(())) => warn!("Notification pump stopped, keepalive skipped"),
        }
    }
}

async fn pump<C: Subscription>(
    mut conn: C,
    channel: String,
    notify_tx: mpsc::Sender<Notification>,
    mut ping_rx: mpsc::Receiver<()>,
) {
    let mut backoff = Backoff::default();

    loop {
        tokio::select! {
            Some(()) = ping_rx.recv() => {
                match tokio::time::timeout(PING_TIMEOUT, conn.keepalive()).await {
                    Ok(Ok(())) => debug!(channel = %channel, "Listener keepalive ok"),
                    Ok(Err(e)) => warn!(channel = %channel, error = %e, "Listener keepalive failed"),
                    Err(_) => warn!(channel = %channel, "Listener keepalive timed out"),
                }
            }

            result = conn.next_notification() => match result {
                Ok(notification) => {
                    backoff.reset();
                    if notify_tx.send(notification).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        channel = %channel,
                        error = %e,
                        retry_in = ?delay,
                        "Detected error on notification listener"
                    );
                    tokio::time::sleep(delay).await;
                }
            },
        }
    }

    debug!(channel = %channel, "Notification pump stopped");
}
