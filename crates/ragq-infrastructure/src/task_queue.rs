//! In-process FIFO task queue with a fixed worker pool (C8).
//!
//! A bounded `tokio::sync::mpsc` channel stands in for the teacher's
//! process-global work queue; `TASK_QUEUE_WORKER_COUNT` tasks drain it
//! concurrently. Submission order is preserved only up to the worker
//! count, matching the specification's ordering guarantee.

use std::sync::Arc;

use ragq_application::KnowledgeTaskProcessor;
use ragq_domain::entities::{KnowledgeTask, TaskStatus};
use ragq_domain::error::Result;
use ragq_domain::ports::repositories::TaskRepository;
use tokio::sync::mpsc;

use crate::constants::{TASK_QUEUE_CAPACITY, TASK_QUEUE_WORKER_COUNT};

const ERROR_MESSAGE_MAX_LEN: usize = 500;

/// Submits [`KnowledgeTask`]s to a bounded channel drained by a fixed
/// pool of workers.
pub struct TaskQueue {
    sender: mpsc::Sender<KnowledgeTask>,
}

impl TaskQueue {
    /// Spawn `TASK_QUEUE_WORKER_COUNT` workers draining a
    /// `TASK_QUEUE_CAPACITY`-deep channel, each running `processor` and
    /// persisting status transitions through `repository`.
    pub fn spawn(processor: Arc<KnowledgeTaskProcessor>, repository: Arc<dyn TaskRepository>) -> Self {
        let (sender, receiver) = mpsc::channel(TASK_QUEUE_CAPACITY);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        for worker_id in 0..TASK_QUEUE_WORKER_COUNT {
            let receiver = receiver.clone();
            let processor = processor.clone();
            let repository = repository.clone();
            tokio::spawn(async move {
                worker_loop(worker_id, receiver, processor, repository).await;
            });
        }

        Self { sender }
    }

    /// Enqueue a task already persisted in `Pending` state. Returns an
    /// error if the queue is at capacity.
    pub async fn submit(&self, task: KnowledgeTask) -> Result<()> {
        self.sender
            .send(task)
            .await
            .map_err(|_| ragq_domain::error::Error::unavailable("task queue is shutting down"))
    }
}

async fn worker_loop(
    _worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<KnowledgeTask>>>,
    processor: Arc<KnowledgeTaskProcessor>,
    repository: Arc<dyn TaskRepository>,
) {
    loop {
        let task = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(task) = task else {
            break;
        };

        let _ = repository
            .update_status(&task.task_id, TaskStatus::Processing, None, None)
            .await;

        match processor.process(&task).await {
            Ok(entry_id) => {
                let _ = repository
                    .update_status(&task.task_id, TaskStatus::Completed, Some(&entry_id), None)
                    .await;
            }
            Err(err) => {
                let message = truncate(&err.to_string(), ERROR_MESSAGE_MAX_LEN);
                let _ = repository
                    .update_status(&task.task_id, TaskStatus::Failed, None, Some(&message))
                    .await;
            }
        }
    }
}

fn truncate(message: &str, max_len: usize) -> String {
    if message.len() <= max_len {
        message.to_string()
    } else {
        let end = message.char_indices().nth(max_len).map(|(i, _)| i).unwrap_or(message.len());
        format!("{}...", &message[..end])
    }
}
