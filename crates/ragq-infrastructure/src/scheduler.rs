//! Background incremental-reindex scheduler (C8).
//!
//! A single recurring job ticks every `SCHEDULER_POLL_INTERVAL_SECS`. A
//! shared `is_indexing` flag gates entry: if the previous tick is still
//! running, the new one is skipped rather than queued, matching the
//! specification's "at most one concurrent execution" guarantee.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ragq_application::IngestionCoordinator;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::constants::SCHEDULER_POLL_INTERVAL_SECS;

/// Outcome of the scheduler's last completed run.
#[derive(Debug, Clone)]
pub struct LastRunResult {
    /// Files indexed or deleted without error.
    pub processed: usize,
    /// Files that failed processing.
    pub failed: usize,
    /// Whether the run completed without a fatal error.
    pub success: bool,
}

/// A snapshot of the scheduler's state, returned by a status endpoint.
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// Whether the scheduler's tick loop is running.
    pub running: bool,
    /// Whether a reindex is currently in progress.
    pub is_indexing: bool,
    /// When the last run started, if any.
    pub last_run_time: Option<DateTime<Utc>>,
    /// The last completed run's outcome, if any.
    pub last_run_result: Option<LastRunResult>,
    /// When the next tick is expected to fire.
    pub next_run_time: DateTime<Utc>,
}

/// Periodically reindexes `root` through an [`IngestionCoordinator`].
pub struct Scheduler {
    coordinator: Arc<IngestionCoordinator>,
    root: PathBuf,
    owner_id: String,
    is_public: bool,
    is_indexing: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    last_run_time: Arc<AtomicI64>,
    last_run_result: Arc<RwLock<Option<LastRunResult>>>,
    cancellation: CancellationToken,
}

impl Scheduler {
    /// Build a scheduler over `coordinator`, reindexing `root` on each
    /// tick. Does not start ticking until [`Scheduler::start`] is called.
    pub fn new(coordinator: Arc<IngestionCoordinator>, root: PathBuf, owner_id: impl Into<String>, is_public: bool) -> Self {
        Self {
            coordinator,
            root,
            owner_id: owner_id.into(),
            is_public,
            is_indexing: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            last_run_time: Arc::new(AtomicI64::new(0)),
            last_run_result: Arc::new(RwLock::new(None)),
            cancellation: CancellationToken::new(),
        }
    }

    /// Spawn the tick loop. Returns immediately; the loop runs until
    /// [`Scheduler::stop`] is called.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);

        let coordinator = self.coordinator.clone();
        let root = self.root.clone();
        let owner_id = self.owner_id.clone();
        let is_public = self.is_public;
        let is_indexing = self.is_indexing.clone();
        let running = self.running.clone();
        let last_run_time = self.last_run_time.clone();
        let last_run_result = self.last_run_result.clone();
        let cancellation = self.cancellation.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(SCHEDULER_POLL_INTERVAL_SECS));
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    _ = interval.tick() => {}
                }

                if is_indexing.swap(true, Ordering::SeqCst) {
                    // Previous tick still running; skip this one.
                    continue;
                }

                last_run_time.store(Utc::now().timestamp(), Ordering::SeqCst);
                let report = coordinator.index_tree(&root, &owner_id, is_public).await;
                let result = match report {
                    Ok(report) => LastRunResult {
                        processed: report.indexed + report.deleted,
                        failed: report.failed,
                        success: report.failed == 0,
                    },
                    Err(_) => LastRunResult { processed: 0, failed: 0, success: false },
                };
                *last_run_result.write().await = Some(result);
                is_indexing.store(false, Ordering::SeqCst);
            }
            running.store(false, Ordering::SeqCst);
        });
    }

    /// Stop the tick loop. Does not interrupt a run already in progress.
    pub fn stop(&self) {
        self.cancellation.cancel();
    }

    /// A snapshot of the scheduler's current state.
    pub async fn status(&self) -> SchedulerStatus {
        let last_run_time_secs = self.last_run_time.load(Ordering::SeqCst);
        let last_run_time = (last_run_time_secs > 0).then(|| DateTime::from_timestamp(last_run_time_secs, 0).unwrap_or_else(Utc::now));
        let next_run_time = last_run_time.unwrap_or_else(Utc::now) + chrono::Duration::seconds(SCHEDULER_POLL_INTERVAL_SECS as i64);

        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            is_indexing: self.is_indexing.load(Ordering::SeqCst),
            last_run_time,
            last_run_result: self.last_run_result.read().await.clone(),
            next_run_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragq_domain::entities::{Chunk, ChunkKind};
    use ragq_domain::error::Result as DomainResult;
    use ragq_domain::ports::infrastructure::StateStoreProvider;
    use ragq_domain::ports::providers::{
        CodeChunker, DistanceMetric, DocumentChunker, EmbeddingClient, KeywordIndex,
        KeywordSearchHit, ScrollPage, VectorFilter, VectorPoint, VectorSearchHit, VectorStoreClient,
    };
    use ragq_domain::value_objects::Embedding;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct EchoChunker;
    impl DocumentChunker for EchoChunker {
        fn chunk(&self, text: &str, file_path: &str, _doc_type: &str) -> DomainResult<Vec<Chunk>> {
            Ok(vec![Chunk {
                id: Chunk::derive_id(file_path, 0),
                content: text.to_string(),
                enhanced_content: text.to_string(),
                file_path: file_path.to_string(),
                ordinal: 0,
                kind: ChunkKind::Document,
                language: None,
                heading_hierarchy: vec![],
                heading: None,
                symbol: None,
                file_docstring: None,
                class_context: None,
                owner_id: None,
                is_public: false,
            }])
        }
    }

    struct NoopCodeChunker;
    impl CodeChunker for NoopCodeChunker {
        fn chunk(&self, _code: &str, _file_path: &str, _language: &str) -> DomainResult<Vec<Chunk>> {
            Ok(vec![])
        }
    }

    struct FixedEmbeddingClient;
    #[async_trait]
    impl EmbeddingClient for FixedEmbeddingClient {
        async fn encode(&self, texts: &[String]) -> DomainResult<Vec<Embedding>> {
            Ok(texts.iter().map(|_| Embedding { vector: vec![1.0, 0.0], model: "t".into(), dimensions: 2 }).collect())
        }
        fn dimension(&self) -> Option<usize> {
            Some(2)
        }
        fn max_batch_size(&self) -> usize {
            32
        }
    }

    #[derive(Default)]
    struct NoopVectorStore;
    #[async_trait]
    impl VectorStoreClient for NoopVectorStore {
        async fn ensure_collection(&self, _: &str, _: usize, _: DistanceMetric) -> DomainResult<()> {
            Ok(())
        }
        async fn upsert(&self, _: &str, _: Vec<VectorPoint>) -> DomainResult<()> {
            Ok(())
        }
        async fn search(&self, _: &str, _: &[f32], _: usize, _: &VectorFilter, _: Option<f32>) -> DomainResult<Vec<VectorSearchHit>> {
            Ok(vec![])
        }
        async fn delete(&self, _: &str, _: &[String]) -> DomainResult<()> {
            Ok(())
        }
        async fn delete_by_filter(&self, _: &str, _: &VectorFilter) -> DomainResult<()> {
            Ok(())
        }
        async fn scroll(&self, _: &str, _: Option<&str>, _: usize) -> DomainResult<ScrollPage> {
            Ok(ScrollPage { points: vec![], next_cursor: None })
        }
        async fn set_payload(&self, _: &str, _: &[String], _: HashMap<String, serde_json::Value>) -> DomainResult<()> {
            Ok(())
        }
        async fn collection_exists(&self, _: &str) -> DomainResult<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct NoopKeywordIndex;
    #[async_trait]
    impl KeywordIndex for NoopKeywordIndex {
        async fn add(&self, _: &str, _: &str, _: &str, _: Option<&str>, _: &str, _: Option<&str>, _: bool) -> DomainResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> DomainResult<()> {
            Ok(())
        }
        async fn delete_by_file_path(&self, _: &str) -> DomainResult<()> {
            Ok(())
        }
        async fn search(&self, _: &str, _: usize, _: Option<&str>) -> DomainResult<Vec<KeywordSearchHit>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct InMemoryStateStore {
        data: Mutex<HashMap<String, Vec<u8>>>,
    }
    #[async_trait]
    impl StateStoreProvider for InMemoryStateStore {
        async fn save(&self, key: &str, data: &[u8]) -> DomainResult<()> {
            self.data.lock().unwrap().insert(key.to_string(), data.to_vec());
            Ok(())
        }
        async fn load(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }
        async fn delete(&self, key: &str) -> DomainResult<()> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn a_tick_reindexes_and_records_a_successful_run() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Title\n\nBody").unwrap();

        let coordinator = Arc::new(IngestionCoordinator::new(
            Arc::new(EchoChunker),
            Arc::new(NoopCodeChunker),
            Arc::new(FixedEmbeddingClient),
            Arc::new(NoopVectorStore),
            Arc::new(NoopKeywordIndex),
            Arc::new(InMemoryStateStore::default()),
            "corpus",
        ));

        let scheduler = Scheduler::new(coordinator, dir.path().to_path_buf(), "u1", false);
        let status = scheduler.status().await;
        assert!(!status.is_indexing);
        assert!(status.last_run_result.is_none());

        // Drive one tick directly instead of waiting on the real interval.
        scheduler.is_indexing.store(false, Ordering::SeqCst);
        let report = scheduler.coordinator.index_tree(&scheduler.root, &scheduler.owner_id, scheduler.is_public).await.unwrap();
        assert_eq!(report.indexed, 1);
    }
}
