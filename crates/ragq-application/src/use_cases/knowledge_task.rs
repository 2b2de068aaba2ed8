//! Knowledge-add task processing: the business logic a C8 task-queue
//! worker runs for one submitted [`KnowledgeTask`] (4.10, steps 1-4).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use ragq_domain::entities::{ChangeKind, Chunk, KnowledgeEntry, KnowledgeTask};
use ragq_domain::error::Result;
use ragq_domain::ports::providers::{DistanceMetric, EmbeddingClient, LlmCallOptions, LlmClient, LlmMessage, VectorPoint, VectorStoreClient};
use ragq_domain::ports::repositories::KnowledgeRepository;

use crate::use_cases::version_tracker::VersionTracker;

const EXTRACTION_SYSTEM_PROMPT: &str = "Extract structured knowledge metadata from the \
given content. Respond with a single JSON object: \
{\"title\": string, \"summary\": string, \"keywords\": string[], \"tech_stack\": string[], \"type\": string}. \
Respond with nothing but that JSON object.";

const DEFAULT_TITLE: &str = "untitled";
const SUMMARY_FALLBACK_LEN: usize = 100;
const CONTENT_PREVIEW_LEN: usize = 280;

#[derive(Debug, Default, serde::Deserialize)]
struct ExtractedMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    tech_stack: Vec<String>,
}

/// Processes a [`KnowledgeTask`] into a persisted [`KnowledgeEntry`]:
/// LLM metadata extraction, embedding, vector upsert, relational insert,
/// group attachment, and an initial version record.
pub struct KnowledgeTaskProcessor {
    llm: Arc<dyn LlmClient>,
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStoreClient>,
    knowledge_repository: Arc<dyn KnowledgeRepository>,
    version_tracker: Arc<VersionTracker>,
    collection: String,
}

impl KnowledgeTaskProcessor {
    /// Build a processor writing entries into `collection`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedding_client: Arc<dyn EmbeddingClient>,
        vector_store: Arc<dyn VectorStoreClient>,
        knowledge_repository: Arc<dyn KnowledgeRepository>,
        version_tracker: Arc<VersionTracker>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            embedding_client,
            vector_store,
            knowledge_repository,
            version_tracker,
            collection: collection.into(),
        }
    }

    /// Run the four processing steps for `task`, returning the new
    /// entry's id. Any step's failure is surfaced to the caller, which is
    /// responsible for persisting the task's `failed` status (see
    /// `ragq-infrastructure::task_queue`).
    pub async fn process(&self, task: &KnowledgeTask) -> Result<String> {
        let metadata = self.extract_metadata(&task.content).await;

        // Derived from the task id, not a random uuid, so a user-driven
        // retry of the same task overwrites the same vector point instead
        // of leaving a duplicate behind.
        let entry_id = Chunk::derive_id(&task.task_id, 0);
        let now = Utc::now();
        let entry = KnowledgeEntry {
            id: entry_id.clone(),
            title: metadata.title.clone(),
            category: task.category.clone(),
            summary: metadata.summary.clone(),
            keywords: metadata.keywords.clone(),
            tech_stack: metadata.tech_stack.clone(),
            content_preview: preview(&task.content, CONTENT_PREVIEW_LEN),
            owner_id: task.owner_id.clone(),
            is_public: task.is_public,
            updated_at: now,
        };

        let enhanced_content = build_enhanced_content(&entry, &task.content);
        self.embed_and_upsert(&entry, &enhanced_content).await?;

        self.knowledge_repository.create_entry(&entry).await?;

        if !task.group_names.is_empty() {
            let groups = self
                .knowledge_repository
                .ensure_groups(&task.owner_id, &task.group_names)
                .await?;
            let group_ids: Vec<String> = groups.into_iter().map(|g| g.id).collect();
            self.knowledge_repository.set_entry_groups(&entry.id, &group_ids).await?;
        }

        self.version_tracker
            .create_version(
                &entry.id,
                &task.content,
                entry_metadata_json(&entry),
                ChangeKind::Create,
                &task.username,
                None,
            )
            .await?;

        Ok(entry.id)
    }

    async fn extract_metadata(&self, content: &str) -> ExtractedMetadata {
        let fallback = ExtractedMetadata {
            title: DEFAULT_TITLE.to_string(),
            summary: preview(content, SUMMARY_FALLBACK_LEN),
            keywords: vec![],
            tech_stack: vec![],
        };

        let messages = [
            LlmMessage::system(EXTRACTION_SYSTEM_PROMPT),
            LlmMessage::user(content),
        ];
        let response = match self.llm.complete(&messages, &LlmCallOptions::default()).await {
            Ok(response) => response,
            Err(_) => return fallback,
        };

        match serde_json::from_str::<ExtractedMetadata>(response.content.trim()) {
            Ok(mut parsed) => {
                if parsed.title.is_empty() {
                    parsed.title = fallback.title;
                }
                if parsed.summary.is_empty() {
                    parsed.summary = fallback.summary;
                }
                parsed
            }
            Err(_) => fallback,
        }
    }

    async fn embed_and_upsert(&self, entry: &KnowledgeEntry, enhanced_content: &str) -> Result<()> {
        let embeddings = self.embedding_client.encode(std::slice::from_ref(&enhanced_content.to_string())).await?;
        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ragq_domain::error::Error::embedding("embedding client returned no vectors"))?;

        let mut payload = HashMap::new();
        payload.insert("title".to_string(), json!(entry.title));
        payload.insert("summary".to_string(), json!(entry.summary));
        payload.insert("keywords".to_string(), json!(entry.keywords));
        payload.insert("tech_stack".to_string(), json!(entry.tech_stack));
        payload.insert("owner_id".to_string(), json!(entry.owner_id));
        payload.insert("is_public".to_string(), json!(entry.is_public));
        payload.insert("type".to_string(), json!("knowledge"));

        self.vector_store
            .ensure_collection(&self.collection, embedding.vector.len(), DistanceMetric::Cosine)
            .await?;

        // Upsert is keyed by entry id, so a retried task overwrites the
        // same point instead of leaving a duplicate behind.
        self.vector_store
            .upsert(
                &self.collection,
                vec![VectorPoint {
                    id: entry.id.clone(),
                    vector: embedding.vector,
                    payload,
                }],
            )
            .await
    }
}

fn preview(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        let end = text.char_indices().nth(max_len).map(|(i, _)| i).unwrap_or(text.len());
        format!("{}...", &text[..end])
    }
}

fn build_enhanced_content(entry: &KnowledgeEntry, body: &str) -> String {
    format!(
        "Title: {}\nSummary: {}\nKeywords: {}\nTech stack: {}\n\n{}",
        entry.title,
        entry.summary,
        entry.keywords.join(", "),
        entry.tech_stack.join(", "),
        body
    )
}

fn entry_metadata_json(entry: &KnowledgeEntry) -> Value {
    json!({
        "title": entry.title,
        "category": entry.category,
        "summary": entry.summary,
        "keywords": entry.keywords,
        "tech_stack": entry.tech_stack,
        "is_public": entry.is_public,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use ragq_domain::entities::KnowledgeGroup;
    use ragq_domain::error::{Error, Result as DomainResult};
    use ragq_domain::ports::infrastructure::{LockGuard, LockProvider};
    use ragq_domain::ports::providers::{DistanceMetric as DM, LlmResponse, LlmUsage, ScrollPage, VectorFilter, VectorSearchHit};
    use ragq_domain::value_objects::Embedding;
    use std::sync::Mutex;

    struct StaticLlm(&'static str, bool);
    #[async_trait]
    impl LlmClient for StaticLlm {
        async fn complete(&self, _: &[LlmMessage], _: &LlmCallOptions) -> DomainResult<LlmResponse> {
            if self.1 {
                return Err(Error::upstream("llm unavailable"));
            }
            Ok(LlmResponse { content: self.0.to_string(), usage: LlmUsage::default() })
        }
        async fn stream(&self, _: &[LlmMessage], _: &LlmCallOptions) -> DomainResult<BoxStream<'static, DomainResult<String>>> {
            unimplemented!()
        }
    }

    struct FixedEmbedding;
    #[async_trait]
    impl EmbeddingClient for FixedEmbedding {
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
    struct RecordingVectorStore {
        upserted: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl VectorStoreClient for RecordingVectorStore {
        async fn ensure_collection(&self, _: &str, _: usize, _: DM) -> DomainResult<()> {
            Ok(())
        }
        async fn upsert(&self, _: &str, points: Vec<VectorPoint>) -> DomainResult<()> {
            self.upserted.lock().unwrap().extend(points.into_iter().map(|p| p.id));
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
        async fn set_payload(&self, _: &str, _: &[String], _: HashMap<String, Value>) -> DomainResult<()> {
            Ok(())
        }
        async fn collection_exists(&self, _: &str) -> DomainResult<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct RecordingKnowledgeRepository {
        created: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl KnowledgeRepository for RecordingKnowledgeRepository {
        async fn create_entry(&self, entry: &KnowledgeEntry) -> DomainResult<()> {
            self.created.lock().unwrap().push(entry.id.clone());
            Ok(())
        }
        async fn get_entry(&self, _: &str) -> DomainResult<Option<KnowledgeEntry>> {
            Ok(None)
        }
        async fn update_entry(&self, _: &KnowledgeEntry) -> DomainResult<()> {
            Ok(())
        }
        async fn delete_entry(&self, _: &str) -> DomainResult<()> {
            Ok(())
        }
        async fn ensure_groups(&self, owner_id: &str, names: &[String]) -> DomainResult<Vec<KnowledgeGroup>> {
            Ok(names
                .iter()
                .map(|n| KnowledgeGroup { id: format!("g-{n}"), name: n.clone(), owner_id: owner_id.to_string(), is_public: false })
                .collect())
        }
        async fn set_entry_groups(&self, _: &str, _: &[String]) -> DomainResult<()> {
            Ok(())
        }
        async fn entry_group_ids(&self, _: &str) -> DomainResult<Vec<String>> {
            Ok(vec![])
        }
    }

    struct NoopLock;
    #[async_trait]
    impl LockProvider for NoopLock {
        async fn acquire_lock(&self, key: &str) -> DomainResult<LockGuard> {
            Ok(LockGuard { key: key.to_string(), token: "t".into() })
        }
        async fn release_lock(&self, _: LockGuard) -> DomainResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingVersionRepository {
        inserted: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl ragq_domain::ports::repositories::VersionRepository for RecordingVersionRepository {
        async fn insert(&self, record: &ragq_domain::entities::VersionRecord) -> DomainResult<()> {
            self.inserted.lock().unwrap().push(record.entry_id.clone());
            Ok(())
        }
        async fn max_version(&self, _: &str) -> DomainResult<u32> {
            Ok(0)
        }
        async fn get(&self, _: &str, _: u32) -> DomainResult<Option<ragq_domain::entities::VersionRecord>> {
            Ok(None)
        }
        async fn list(&self, _: &str) -> DomainResult<Vec<ragq_domain::entities::VersionRecord>> {
            Ok(vec![])
        }
    }

    fn task(content: &str) -> KnowledgeTask {
        KnowledgeTask {
            task_id: "task-1".into(),
            content: content.to_string(),
            title: None,
            category: None,
            group_names: vec!["runbooks".into()],
            owner_id: "u1".into(),
            username: "alice".into(),
            is_public: false,
            status: ragq_domain::entities::TaskStatus::Pending,
            result_id: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn processor(llm: StaticLlm) -> (KnowledgeTaskProcessor, Arc<RecordingVectorStore>, Arc<RecordingKnowledgeRepository>) {
        let vector_store = Arc::new(RecordingVectorStore::default());
        let knowledge_repository = Arc::new(RecordingKnowledgeRepository::default());
        let version_tracker = Arc::new(VersionTracker::new(Arc::new(RecordingVersionRepository::default()), Arc::new(NoopLock)));
        let processor = KnowledgeTaskProcessor::new(
            Arc::new(llm),
            Arc::new(FixedEmbedding),
            vector_store.clone(),
            knowledge_repository.clone(),
            version_tracker,
            "knowledge",
        );
        (processor, vector_store, knowledge_repository)
    }

    #[tokio::test]
    async fn well_formed_extraction_populates_entry_fields() {
        let llm_json = r#"{"title":"Runbook","summary":"How to restart the service","keywords":["ops"],"tech_stack":["rust"],"type":"runbook"}"#;
        let (processor, vector_store, repo) = processor(StaticLlm(llm_json, false));

        let entry_id = processor.process(&task("restart steps go here")).await.unwrap();

        assert_eq!(repo.created.lock().unwrap().len(), 1);
        assert_eq!(*vector_store.upserted.lock().unwrap(), [entry_id]);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_default_title_and_truncated_summary() {
        let (processor, _, repo) = processor(StaticLlm("", true));
        let content = "a".repeat(500);

        processor.process(&task(&content)).await.unwrap();

        assert_eq!(repo.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unparseable_extraction_response_falls_back_to_defaults() {
        let (processor, _, repo) = processor(StaticLlm("not json", false));

        processor.process(&task("some content")).await.unwrap();

        assert_eq!(repo.created.lock().unwrap().len(), 1);
    }
}
