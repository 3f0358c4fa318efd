//! Database module for the codefall entry store.
//!
//! Provides async Postgres access using SQLx for:
//! - Looking up unclaimed codefall entries (by key, or at random per owner)
//! - The `LISTEN` subscription announcing new entries ([`pubsub`])
//!
//! Consumers depend on the [`EntryStore`] trait rather than on [`Database`],
//! which keeps command handlers and the notification listener testable
//! without a running server.

mod codes;
pub mod pubsub;

pub use codes::{Code, CodeRepository};
pub use pubsub::PgNotificationSource;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("cannot listen on channel {channel}: {source}")]
    Listen {
        channel: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Read access to unclaimed entries.
///
/// Lookups never fail from the caller's point of view: errors are logged
/// by the implementation and surface as "nothing found".
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// The entry with exactly this key, if any.
    async fn fetch_by_key(&self, key: &str) -> Option<Code>;

    /// Up to `limit` entries owned by `owner`, in random order.
    async fn fetch_random(&self, owner: &str, limit: i64) -> Vec<Code>;
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connect to the store and verify it answers queries.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(Some(Self::IDLE_TIMEOUT))
            .test_before_acquire(true)
            .connect(&config.dsn)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        info!(max_connections = config.max_connections, "Database connected");

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get codefall entry repository.
    pub fn codes(&self) -> CodeRepository<'_> {
        CodeRepository::new(&self.pool)
    }
}

#[async_trait]
impl EntryStore for Database {
    async fn fetch_by_key(&self, key: &str) -> Option<Code> {
        match self.codes().find_by_key(key).await {
            Ok(code) => code,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to look up codefall entry");
                None
            }
        }
    }

    async fn fetch_random(&self, owner: &str, limit: i64) -> Vec<Code> {
        match self.codes().random_for_owner(owner, limit).await {
            Ok(codes) => codes,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Failed to query codefall entries");
                Vec::new()
            }
        }
    }
}
