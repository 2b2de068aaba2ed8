//! `VersionRepository` over the append-only `version_records` table.
//!
//! Monotonicity is enforced with a `(entry_id, version)` uniqueness
//! constraint; callers race to insert `max_version(entry_id) + 1` and must
//! retry on conflict (see the trait's doc comment).

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::entities::{ChangeKind, VersionRecord};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::repositories::VersionRepository;

/// Postgres-backed [`VersionRepository`].
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn insert(&self, record: &VersionRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO version_records \
             (entry_id, version, content, metadata, change_kind, actor, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.entry_id)
        .bind(record.version as i32)
        .bind(&record.content)
        .bind(&record.metadata)
        .bind(change_kind_str(record.change_kind))
        .bind(&record.actor)
        .bind(&record.reason)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to insert version record", e))?;
        Ok(())
    }

    async fn max_version(&self, entry_id: &str) -> Result<u32> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version) FROM version_records WHERE entry_id = $1")
                .bind(entry_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("failed to read max version", e))?;
        Ok(max.unwrap_or(0).max(0) as u32)
    }

    async fn get(&self, entry_id: &str, version: u32) -> Result<Option<VersionRecord>> {
        sqlx::query_as::<_, VersionRow>(
            "SELECT entry_id, version, content, metadata, change_kind, actor, reason, created_at \
             FROM version_records WHERE entry_id = $1 AND version = $2",
        )
        .bind(entry_id)
        .bind(version as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to fetch version record", e))?
        .map(VersionRecord::try_from)
        .transpose()
    }

    async fn list(&self, entry_id: &str) -> Result<Vec<VersionRecord>> {
        let rows = sqlx::query_as::<_, VersionRow>(
            "SELECT entry_id, version, content, metadata, change_kind, actor, reason, created_at \
             FROM version_records WHERE entry_id = $1 ORDER BY version ASC",
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to list version records", e))?;
        rows.into_iter().map(VersionRecord::try_from).collect()
    }
}

fn change_kind_str(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Create => "create",
        ChangeKind::Update => "update",
        ChangeKind::Delete => "delete",
    }
}

fn parse_change_kind(s: &str) -> Result<ChangeKind> {
    match s {
        "create" => Ok(ChangeKind::Create),
        "update" => Ok(ChangeKind::Update),
        "delete" => Ok(ChangeKind::Delete),
        other => Err(Error::database(format!("unknown change kind: {other}"))),
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    entry_id: String,
    version: i32,
    content: String,
    metadata: serde_json::Value,
    change_kind: String,
    actor: String,
    reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<VersionRow> for VersionRecord {
    type Error = Error;

    fn try_from(row: VersionRow) -> Result<Self> {
        Ok(VersionRecord {
            entry_id: row.entry_id,
            version: row.version.max(0) as u32,
            content: row.content,
            metadata: row.metadata,
            change_kind: parse_change_kind(&row.change_kind)?,
            actor: row.actor,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}
