//! Knowledge Task Repository (C8)

use crate::entities::{KnowledgeTask, TaskStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for [`KnowledgeTask`] lifecycle tracking.
///
/// `update_status` is called at every transition (`pending -> processing
/// -> completed | failed`); status must be durable before the worker moves
/// on, so a crash mid-task leaves an inspectable, non-misleading state.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a newly submitted task in `Pending` state.
    async fn create(&self, task: &KnowledgeTask) -> Result<()>;

    /// Fetch a task by id.
    async fn get(&self, task_id: &str) -> Result<Option<KnowledgeTask>>;

    /// Transition a task's status, optionally recording the resulting
    /// entry id (`Completed`) or a truncated error message (`Failed`).
    async fn update_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        result_id: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<()>;
}
