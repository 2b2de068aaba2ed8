//! `KnowledgeRepository` over `knowledge_entries`, `knowledge_groups`, and
//! their `knowledge_entry_groups` join table.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::entities::{KnowledgeEntry, KnowledgeGroup};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::repositories::KnowledgeRepository;

/// Postgres-backed [`KnowledgeRepository`].
pub struct PgKnowledgeRepository {
    pool: PgPool,
}

impl PgKnowledgeRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeRepository for PgKnowledgeRepository {
    async fn create_entry(&self, entry: &KnowledgeEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO knowledge_entries \
             (id, title, category, summary, keywords, tech_stack, content_preview, \
              owner_id, is_public, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&entry.id)
        .bind(&entry.title)
        .bind(&entry.category)
        .bind(&entry.summary)
        .bind(&entry.keywords)
        .bind(&entry.tech_stack)
        .bind(&entry.content_preview)
        .bind(&entry.owner_id)
        .bind(entry.is_public)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to create knowledge entry", e))?;
        Ok(())
    }

    async fn get_entry(&self, id: &str) -> Result<Option<KnowledgeEntry>> {
        sqlx::query_as::<_, KnowledgeEntryRow>(
            "SELECT id, title, category, summary, keywords, tech_stack, content_preview, \
                    owner_id, is_public, updated_at \
             FROM knowledge_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(KnowledgeEntry::from))
        .map_err(|e| Error::database_with_source("failed to fetch knowledge entry", e))
    }

    async fn update_entry(&self, entry: &KnowledgeEntry) -> Result<()> {
        sqlx::query(
            "UPDATE knowledge_entries SET \
             title = $2, category = $3, summary = $4, keywords = $5, tech_stack = $6, \
             content_preview = $7, owner_id = $8, is_public = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(&entry.id)
        .bind(&entry.title)
        .bind(&entry.category)
        .bind(&entry.summary)
        .bind(&entry.keywords)
        .bind(&entry.tech_stack)
        .bind(&entry.content_preview)
        .bind(&entry.owner_id)
        .bind(entry.is_public)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to update knowledge entry", e))?;
        Ok(())
    }

    async fn delete_entry(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM knowledge_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("failed to delete knowledge entry", e))?;
        Ok(())
    }

    async fn ensure_groups(&self, owner_id: &str, names: &[String]) -> Result<Vec<KnowledgeGroup>> {
        let mut groups = Vec::with_capacity(names.len());
        for name in names {
            let row = sqlx::query_as::<_, KnowledgeGroupRow>(
                "INSERT INTO knowledge_groups (id, name, owner_id, is_public) \
                 VALUES (gen_random_uuid()::text, $1, $2, false) \
                 ON CONFLICT (owner_id, name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id, name, owner_id, is_public",
            )
            .bind(name)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("failed to ensure knowledge group", e))?;
            groups.push(row.into());
        }
        Ok(groups)
    }

    async fn set_entry_groups(&self, entry_id: &str, group_ids: &[String]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::database_with_source("failed to start transaction", e))?;

        sqlx::query("DELETE FROM knowledge_entry_groups WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database_with_source("failed to clear entry groups", e))?;

        for group_id in group_ids {
            sqlx::query(
                "INSERT INTO knowledge_entry_groups (entry_id, group_id) VALUES ($1, $2)",
            )
            .bind(entry_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database_with_source("failed to attach entry to group", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::database_with_source("failed to commit entry groups", e))?;
        Ok(())
    }

    async fn entry_group_ids(&self, entry_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT group_id FROM knowledge_entry_groups WHERE entry_id = $1",
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to list entry groups", e))
    }
}

#[derive(sqlx::FromRow)]
struct KnowledgeEntryRow {
    id: String,
    title: String,
    category: Option<String>,
    summary: String,
    keywords: Vec<String>,
    tech_stack: Vec<String>,
    content_preview: String,
    owner_id: String,
    is_public: bool,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<KnowledgeEntryRow> for KnowledgeEntry {
    fn from(row: KnowledgeEntryRow) -> Self {
        KnowledgeEntry {
            id: row.id,
            title: row.title,
            category: row.category,
            summary: row.summary,
            keywords: row.keywords,
            tech_stack: row.tech_stack,
            content_preview: row.content_preview,
            owner_id: row.owner_id,
            is_public: row.is_public,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct KnowledgeGroupRow {
    id: String,
    name: String,
    owner_id: String,
    is_public: bool,
}

impl From<KnowledgeGroupRow> for KnowledgeGroup {
    fn from(row: KnowledgeGroupRow) -> Self {
        KnowledgeGroup {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            is_public: row.is_public,
        }
    }
}
