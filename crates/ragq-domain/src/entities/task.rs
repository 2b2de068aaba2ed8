//! The asynchronous knowledge-ingestion task (C8 task queue).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A knowledge-ingestion task's lifecycle state.
///
/// Transitions are monotonic: `Pending -> Processing -> (Completed |
/// Failed)`. No transition out of a terminal state is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, not yet picked up by a worker.
    Pending,
    /// A worker is currently processing this task.
    Processing,
    /// Processing finished successfully.
    Completed,
    /// Processing failed; see `error_message`.
    Failed,
}

/// A submitted `/add_knowledge` task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeTask {
    /// Stable identifier, returned to the caller immediately on submission.
    pub task_id: String,
    /// Raw content to extract knowledge from.
    pub content: String,
    /// Caller-supplied title, if any (LLM extraction fills a default when
    /// absent or on extraction failure).
    pub title: Option<String>,
    /// Caller-supplied category, if any.
    pub category: Option<String>,
    /// Group names the resulting entry should be attached to.
    pub group_names: Vec<String>,
    /// User id the resulting entry will be owned by.
    pub owner_id: String,
    /// Username, carried for audit/display purposes.
    pub username: String,
    /// Whether the resulting entry should be public.
    pub is_public: bool,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// The resulting knowledge entry id, set once `status == Completed`.
    pub result_id: Option<String>,
    /// Truncated error message, set only when `status == Failed`.
    pub error_message: Option<String>,
    /// When the task was submitted.
    pub created_at: DateTime<Utc>,
    /// When the task last changed status.
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeTask {
    /// Whether this task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }
}
