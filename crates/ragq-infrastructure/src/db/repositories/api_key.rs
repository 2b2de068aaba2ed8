//! `ApiKeyRepository` over `api_keys` and `users` tables.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::entities::{ApiKey, User};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::repositories::ApiKeyRepository;

/// Postgres-backed [`ApiKeyRepository`].
pub struct PgApiKeyRepository {
    pool: PgPool,
}

impl PgApiKeyRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn find_key(&self, key: &str) -> Result<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKeyRow>(
            "SELECT key, owner_user_id, active, expires_at, usage_count \
             FROM api_keys WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(ApiKey::from))
        .map_err(|e| Error::database_with_source("failed to look up api key", e))
    }

    async fn record_key_usage(&self, key: &str) -> Result<()> {
        sqlx::query("UPDATE api_keys SET usage_count = usage_count + 1 WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("failed to record api key usage", e))?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_admin, is_active FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(User::from))
        .map_err(|e| Error::database_with_source("failed to look up user", e))
    }

    async fn find_first_administrator(&self) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_admin, is_active FROM users \
             WHERE is_admin = true ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(User::from))
        .map_err(|e| Error::database_with_source("failed to look up administrator", e))
    }
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    key: String,
    owner_user_id: Option<String>,
    active: bool,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    usage_count: i64,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            key: row.key,
            owner_user_id: row.owner_user_id,
            active: row.active,
            expires_at: row.expires_at,
            usage_count: row.usage_count.max(0) as u64,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    is_admin: bool,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
            is_active: row.is_active,
        }
    }
}
