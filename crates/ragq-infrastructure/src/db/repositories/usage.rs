//! `UsageRepository` over the append-only `usage_logs` table.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::entities::{RequestKind, UsageLog};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::repositories::UsageRepository;

/// Postgres-backed [`UsageRepository`].
pub struct PgUsageRepository {
    pool: PgPool,
}

impl PgUsageRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    async fn record(&self, log: &UsageLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO usage_logs \
             (provider, model, user_id, request_kind, question, answer_preview, \
              input_tokens, output_tokens, cost_estimate, duration_ms, retrieved_count, \
              reranked, success, error, client_ip, user_agent, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&log.provider)
        .bind(&log.model)
        .bind(&log.user_id)
        .bind(request_kind_str(log.request_kind))
        .bind(&log.question)
        .bind(&log.answer_preview)
        .bind(log.input_tokens as i64)
        .bind(log.output_tokens as i64)
        .bind(log.cost_estimate)
        .bind(log.duration_ms as i64)
        .bind(log.retrieved_count as i64)
        .bind(log.reranked)
        .bind(log.success)
        .bind(&log.error)
        .bind(&log.client_ip)
        .bind(&log.user_agent)
        .bind(log.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to record usage log", e))?;
        Ok(())
    }
}

fn request_kind_str(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Query => "query",
        RequestKind::Summarization => "summarization",
        RequestKind::Extraction => "extraction",
    }
}
