//! Postgres connection pool builder.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use ragq_domain::error::{Error, Result};

use crate::config::DatabaseConfig;

/// Build a [`PgPool`] from [`DatabaseConfig`], applying the configured
/// min/max connection counts and timeouts.
pub async fn build_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
        .map_err(|e| Error::database_with_source("failed to connect to postgres", e))
}
