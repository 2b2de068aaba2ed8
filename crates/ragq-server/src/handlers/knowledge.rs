//! `/knowledge`: submits a `KnowledgeTask` to the C8 task queue and lets
//! the caller poll for its outcome.

use std::sync::Arc;

use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use ragq_domain::entities::{KnowledgeTask, TaskStatus};
use ragq_infrastructure::AppContext;

use crate::auth::AuthenticatedUser;
use crate::error_response::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddKnowledgeRequest {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub group_names: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseBody {
    pub task_id: String,
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct TaskStatusBody {
    pub task_id: String,
    pub status: TaskStatus,
    pub result_id: Option<String>,
    pub error_message: Option<String>,
}

impl From<KnowledgeTask> for TaskStatusBody {
    fn from(task: KnowledgeTask) -> Self {
        Self {
            task_id: task.task_id,
            status: task.status,
            result_id: task.result_id,
            error_message: task.error_message,
        }
    }
}

/// Submit raw content for LLM-driven metadata extraction and indexing.
/// Returns immediately with a task id; the task runs asynchronously on
/// the C8 worker pool.
#[post("/knowledge", data = "<body>")]
pub async fn submit(
    context: &State<Arc<AppContext>>,
    user: AuthenticatedUser,
    body: Json<AddKnowledgeRequest>,
) -> Result<Json<SubmitResponseBody>, ApiError> {
    let now = Utc::now();
    let task = KnowledgeTask {
        task_id: uuid::Uuid::new_v4().to_string(),
        content: body.content.clone(),
        title: body.title.clone(),
        category: body.category.clone(),
        group_names: body.group_names.clone(),
        owner_id: user.user_id.clone(),
        username: user.username.clone(),
        is_public: body.is_public,
        status: TaskStatus::Pending,
        result_id: None,
        error_message: None,
        created_at: now,
        updated_at: now,
    };

    context.task_repository.create(&task).await?;
    context.task_queue.submit(task.clone()).await?;

    Ok(Json(SubmitResponseBody {
        task_id: task.task_id,
        status: task.status,
    }))
}

/// Poll a submitted task's lifecycle state.
#[get("/knowledge/tasks/<task_id>")]
pub async fn task_status(
    context: &State<Arc<AppContext>>,
    _user: AuthenticatedUser,
    task_id: &str,
) -> Result<Json<TaskStatusBody>, ApiError> {
    let task = context
        .task_repository
        .get(task_id)
        .await?
        .ok_or_else(|| ragq_domain::error::Error::not_found(format!("task {task_id}")))?;

    Ok(Json(task.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> KnowledgeTask {
        let now = chrono::Utc::now();
        KnowledgeTask {
            task_id: "t1".to_string(),
            content: "some content".to_string(),
            title: Some("title".to_string()),
            category: None,
            group_names: Vec::new(),
            owner_id: "u1".to_string(),
            username: "alice".to_string(),
            is_public: false,
            status: TaskStatus::Completed,
            result_id: Some("entry-1".to_string()),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn task_status_body_carries_result_on_completion() {
        let body: TaskStatusBody = task().into();
        assert_eq!(body.task_id, "t1");
        assert_eq!(body.status, TaskStatus::Completed);
        assert_eq!(body.result_id.as_deref(), Some("entry-1"));
        assert!(body.error_message.is_none());
    }
}
