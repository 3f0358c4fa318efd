//! Codefall entry repository.
//!
//! Reads the `codefall_unclaimed` view. Claiming happens elsewhere; this
//! side never writes.

use super::DbError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::warn;

/// One unclaimed giveaway entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub description: String,
    pub code_type: String,
    /// Secret key; appended to the codefall base URL.
    pub key: String,
}

impl Code {
    /// Claim link for this entry.
    pub fn link(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.key)
    }
}

impl TryFrom<&PgRow> for Code {
    type Error = sqlx::Error;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        Ok(Code {
            description: row.try_get("description")?,
            code_type: row.try_get("code_type")?,
            key: row.try_get("key")?,
        })
    }
}

/// Repository for codefall entries.
pub struct CodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CodeRepository<'a> {
    /// Create a new codefall repository.
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the entry with the given key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Code>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT description, code_type, key
            FROM codefall_unclaimed
            WHERE key = $1
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(Code::try_from)
            .transpose()
            .map_err(DbError::from)
    }

    /// Up to `limit` random entries owned by `owner`.
    ///
    /// Rows that cannot be decoded are skipped with a warning.
    pub async fn random_for_owner(&self, owner: &str, limit: i64) -> Result<Vec<Code>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT description, code_type, key
            FROM codefall_unclaimed
            WHERE user_name = $1
            ORDER BY random()
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| match Code::try_from(row) {
                Ok(code) => Some(code),
                Err(e) => {
                    warn!(owner = %owner, error = %e, "Skipping malformed codefall row");
                    None
                }
            })
            .collect())
    }
}
