//! `TaskRepository` over the `knowledge_tasks` table.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use ragq_domain::entities::{KnowledgeTask, TaskStatus};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::repositories::TaskRepository;

/// Postgres-backed [`TaskRepository`].
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: &KnowledgeTask) -> Result<()> {
        sqlx::query(
            "INSERT INTO knowledge_tasks \
             (task_id, content, title, category, group_names, owner_id, username, \
              is_public, status, result_id, error_message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&task.task_id)
        .bind(&task.content)
        .bind(&task.title)
        .bind(&task.category)
        .bind(&task.group_names)
        .bind(&task.owner_id)
        .bind(&task.username)
        .bind(task.is_public)
        .bind(status_str(task.status))
        .bind(&task.result_id)
        .bind(&task.error_message)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to create task", e))?;
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<KnowledgeTask>> {
        sqlx::query_as::<_, TaskRow>(
            "SELECT task_id, content, title, category, group_names, owner_id, username, \
                    is_public, status, result_id, error_message, created_at, updated_at \
             FROM knowledge_tasks WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to fetch task", e))?
        .map(KnowledgeTask::try_from)
        .transpose()
    }

    async fn update_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        result_id: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE knowledge_tasks SET status = $2, result_id = $3, error_message = $4, \
             updated_at = now() WHERE task_id = $1",
        )
        .bind(task_id)
        .bind(status_str(status))
        .bind(result_id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("failed to update task status", e))?;
        Ok(())
    }
}

fn status_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Processing => "processing",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
    }
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "processing" => Ok(TaskStatus::Processing),
        "completed" => Ok(TaskStatus::Completed),
        "failed" => Ok(TaskStatus::Failed),
        other => Err(Error::database(format!("unknown task status: {other}"))),
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    task_id: String,
    content: String,
    title: Option<String>,
    category: Option<String>,
    group_names: Vec<String>,
    owner_id: String,
    username: String,
    is_public: bool,
    status: String,
    result_id: Option<String>,
    error_message: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TaskRow> for KnowledgeTask {
    type Error = Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(KnowledgeTask {
            task_id: row.task_id,
            content: row.content,
            title: row.title,
            category: row.category,
            group_names: row.group_names,
            owner_id: row.owner_id,
            username: row.username,
            is_public: row.is_public,
            status: parse_status(&row.status)?,
            result_id: row.result_id,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
