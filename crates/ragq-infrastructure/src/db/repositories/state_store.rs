//! `StateStoreProvider` over a single-table key-value store. Backs the
//! ingestion coordinator's persisted indexing state (4.4) so a restart
//! resumes incremental indexing instead of reprocessing the whole tree.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::StateStoreProvider;

/// Postgres-backed [`StateStoreProvider`], keyed over a `kv_state` table
/// with columns `(key text primary key, value bytea)`.
pub struct PgStateStoreProvider {
    pool: PgPool,
}

impl PgStateStoreProvider {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStoreProvider for PgStateStoreProvider {
    async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_state (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to save state", e))?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv_state WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("failed to load state", e))?;
        Ok(row.map(|(value,)| value))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_state WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("failed to delete state", e))?;
        Ok(())
    }
}
