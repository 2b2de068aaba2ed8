//! Ingestion coordinator: discovery, incremental change detection, and
//! dual-write to the vector store and keyword index (C5).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use serde_json::json;
use sha2::{Digest, Sha256};

use ragq_domain::constants::INDEXING_BATCH_SIZE;
use ragq_domain::entities::{Chunk, ChunkKind, FileIndexRecord, IndexingState};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::StateStoreProvider;
use ragq_domain::ports::providers::{
    CodeChunker, DistanceMetric, DocumentChunker, EmbeddingClient, KeywordIndex, VectorPoint,
    VectorStoreClient,
};

/// Persistence key the indexing state is stored under.
const INDEXING_STATE_KEY: &str = "ingestion/indexing_state.json";

const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target", "dist", "build", "__pycache__", ".venv"];

const CODE_EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("go", "go"),
    ("java", "java"),
];

const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "txt", "rst"];

/// Classification of a discovered file.
enum FileClass {
    Code(&'static str),
    Document(&'static str),
}

fn classify(path: &Path) -> Option<FileClass> {
    let ext = path.extension()?.to_str()?;
    if let Some((_, language)) = CODE_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
        return Some(FileClass::Code(language));
    }
    if DOC_EXTENSIONS.contains(&ext) {
        return Some(FileClass::Document(if ext == "md" || ext == "mdx" { "markdown" } else { "plaintext" }));
    }
    None
}

/// Outcome of a discovery/change-detection/dual-write pass.
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    /// Files successfully processed (new or modified).
    pub indexed: usize,
    /// Files removed from both indexes.
    pub deleted: usize,
    /// Files that failed processing; the batch continues regardless.
    pub failed: usize,
    /// Truncated error messages, one per failure.
    pub errors: Vec<String>,
}

impl IngestionReport {
    fn merge(&mut self, other: IngestionReport) {
        self.indexed += other.indexed;
        self.deleted += other.deleted;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }
}

/// Coordinates C4 (chunking), C1 (embedding), C2 (vector store), and C3
/// (keyword index) into the ingestion algorithm in the specification's
/// C5 section: discover, detect changes, chunk + embed + dual-write,
/// clean up deletions, persist state only on success.
pub struct IngestionCoordinator {
    document_chunker: Arc<dyn DocumentChunker>,
    code_chunker: Arc<dyn CodeChunker>,
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStoreClient>,
    keyword_index: Arc<dyn KeywordIndex>,
    state_store: Arc<dyn StateStoreProvider>,
    collection: String,
}

impl IngestionCoordinator {
    /// Build a coordinator writing chunks into `collection`.
    pub fn new(
        document_chunker: Arc<dyn DocumentChunker>,
        code_chunker: Arc<dyn CodeChunker>,
        embedding_client: Arc<dyn EmbeddingClient>,
        vector_store: Arc<dyn VectorStoreClient>,
        keyword_index: Arc<dyn KeywordIndex>,
        state_store: Arc<dyn StateStoreProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            document_chunker,
            code_chunker,
            embedding_client,
            vector_store,
            keyword_index,
            state_store,
            collection: collection.into(),
        }
    }

    /// Walk `root`, compute the new/modified/deleted set against the
    /// persisted indexing state, and process it.
    pub async fn index_tree(&self, root: &Path, owner_id: &str, is_public: bool) -> Result<IngestionReport> {
        let mut state = self.load_state().await?;
        let discovered = self.discover(root);

        let mut report = IngestionReport::default();

        let deleted_paths: Vec<String> = state
            .files
            .keys()
            .filter(|path| !discovered.contains_key(path.as_str()))
            .cloned()
            .collect();
        for path in deleted_paths {
            self.delete_file_locked(&path, &mut state).await;
            report.deleted += 1;
        }

        for (path, hash_and_mtime) in &discovered {
            let (content_hash, modified_at) = hash_and_mtime;
            let needs_processing = match state.files.get(path) {
                None => true,
                Some(record) => record.modified_at != *modified_at && record.content_hash != *content_hash,
            };
            if !needs_processing {
                continue;
            }
            match self.index_file_inner(Path::new(path), owner_id, is_public, &mut state).await {
                Ok(()) => report.indexed += 1,
                Err(err) => {
                    report.failed += 1;
                    report.errors.push(format!("{path}: {err}"));
                }
            }
        }

        self.save_state(&state).await?;
        Ok(report)
    }

    /// Force every discovered file through processing, overwriting the
    /// indexing state on completion.
    pub async fn full_reindex(&self, root: &Path, owner_id: &str, is_public: bool) -> Result<IngestionReport> {
        let mut state = IndexingState::empty();
        let discovered = self.discover(root);
        let mut report = IngestionReport::default();

        for path in discovered.keys() {
            match self.index_file_inner(Path::new(path), owner_id, is_public, &mut state).await {
                Ok(()) => report.indexed += 1,
                Err(err) => {
                    report.failed += 1;
                    report.errors.push(format!("{path}: {err}"));
                }
            }
        }

        self.save_state(&state).await?;
        Ok(report)
    }

    /// Process a single file outside of a tree walk, e.g. in response to a
    /// filesystem watch event.
    pub async fn index_file(&self, path: &Path, owner_id: &str, is_public: bool) -> Result<IngestionReport> {
        let mut state = self.load_state().await?;
        let mut report = IngestionReport::default();
        match self.index_file_inner(path, owner_id, is_public, &mut state).await {
            Ok(()) => report.indexed += 1,
            Err(err) => {
                report.failed += 1;
                report.errors.push(err.to_string());
                return Ok(report);
            }
        }
        self.save_state(&state).await?;
        Ok(report)
    }

    /// Delete a single file's chunks from both indexes and the state.
    pub async fn delete_file(&self, path: &str) -> Result<()> {
        let mut state = self.load_state().await?;
        self.delete_file_locked(path, &mut state).await;
        self.save_state(&state).await
    }

    async fn delete_file_locked(&self, path: &str, state: &mut IndexingState) {
        if let Some(record) = state.files.remove(path) {
            if !record.point_ids.is_empty() {
                let _ = self.vector_store.delete(&self.collection, &record.point_ids).await;
            }
            let _ = self.keyword_index.delete_by_file_path(path).await;
        }
    }

    /// Read, chunk, batch-embed, and dual-write a single file. The state
    /// entry is only updated by the caller after this returns `Ok`.
    async fn index_file_inner(
        &self,
        path: &Path,
        owner_id: &str,
        is_public: bool,
        state: &mut IndexingState,
    ) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_source("reading source file", e))?;
        let content_hash = content_hash(&text);
        let modified_at = modified_time(path)?;

        let chunks = match classify(path) {
            Some(FileClass::Code(language)) => self.code_chunker.chunk(&text, &path_str, language)?,
            Some(FileClass::Document(doc_type)) => self.document_chunker.chunk(&text, &path_str, doc_type)?,
            None => return Err(Error::invalid_argument(format!("unsupported file type: {path_str}"))),
        };

        if let Some(old) = state.files.get(&path_str) {
            if !old.point_ids.is_empty() {
                let _ = self.vector_store.delete(&self.collection, &old.point_ids).await;
            }
            let _ = self.keyword_index.delete_by_file_path(&path_str).await;
        }

        let mut point_ids = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(INDEXING_BATCH_SIZE) {
            self.upsert_batch(batch, owner_id, is_public, &mut point_ids).await?;
        }

        state.files.insert(
            path_str,
            FileIndexRecord {
                content_hash,
                modified_at,
                last_indexed_at: Utc::now(),
                point_ids,
            },
        );
        Ok(())
    }

    async fn upsert_batch(
        &self,
        chunks: &[Chunk],
        owner_id: &str,
        is_public: bool,
        point_ids: &mut Vec<String>,
    ) -> Result<()> {
        let texts: Vec<String> = chunks.iter().map(|c| c.enhanced_content.clone()).collect();
        let embeddings = self.embedding_client.encode(&texts).await?;

        let mut points = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let mut payload = HashMap::new();
            payload.insert("content".to_string(), json!(chunk.content));
            payload.insert("original_content".to_string(), json!(chunk.content));
            payload.insert("file_path".to_string(), json!(chunk.file_path));
            payload.insert(
                "type".to_string(),
                json!(match chunk.kind {
                    ChunkKind::Code => "code",
                    ChunkKind::Document => "document",
                }),
            );
            if let Some(language) = &chunk.language {
                payload.insert("language".to_string(), json!(language));
            }
            payload.insert("chunk_index".to_string(), json!(chunk.ordinal));
            if let Some(symbol) = &chunk.symbol {
                payload.insert("symbol".to_string(), json!(symbol));
            }
            if let Some(heading) = &chunk.heading {
                payload.insert("heading".to_string(), json!(heading));
            }
            if let Some(class_context) = &chunk.class_context {
                payload.insert("class_context".to_string(), json!(class_context));
            }
            payload.insert("owner_id".to_string(), json!(owner_id));
            payload.insert("is_public".to_string(), json!(is_public));

            points.push(VectorPoint {
                id: chunk.id.clone(),
                vector: embedding.vector,
                payload,
            });
            point_ids.push(chunk.id.clone());

            self.keyword_index
                .add(
                    &chunk.id,
                    &chunk.content,
                    chunk.heading.as_deref().unwrap_or(&chunk.file_path),
                    None,
                    &chunk.file_path,
                    Some(owner_id),
                    is_public,
                )
                .await?;
        }

        self.vector_store
            .ensure_collection(&self.collection, points.first().map_or(0, |p| p.vector.len()), DistanceMetric::Cosine)
            .await?;
        self.vector_store.upsert(&self.collection, points).await
    }

    /// Walk `root`, applying [`SKIP_DIRS`] and extension classification,
    /// returning `path -> (content hash, modified time)`.
    fn discover(&self, root: &Path) -> HashMap<String, (String, DateTime<Utc>)> {
        let mut found = HashMap::new();
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !SKIP_DIRS.contains(&name))
                    .unwrap_or(true)
            })
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() || classify(path).is_none() {
                continue;
            }
            let Ok(text) = std::fs::read_to_string(path) else {
                continue;
            };
            let Ok(modified_at) = modified_time(path) else {
                continue;
            };
            found.insert(path.to_string_lossy().to_string(), (content_hash(&text), modified_at));
        }
        found
    }

    async fn load_state(&self) -> Result<IndexingState> {
        match self.state_store.load(INDEXING_STATE_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(Error::from),
            None => Ok(IndexingState::empty()),
        }
    }

    async fn save_state(&self, state: &IndexingState) -> Result<()> {
        let bytes = serde_json::to_vec(state)?;
        self.state_store.save(INDEXING_STATE_KEY, &bytes).await
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn modified_time(path: &Path) -> Result<DateTime<Utc>> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::io_with_source("reading file metadata", e))?;
    let modified = metadata.modified().map_err(|e| Error::io_with_source("reading mtime", e))?;
    Ok(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragq_domain::ports::providers::{KeywordSearchHit, ScrollPage, VectorFilter, VectorSearchHit};
    use ragq_domain::value_objects::Embedding;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct EchoChunker;

    impl DocumentChunker for EchoChunker {
        fn chunk(&self, text: &str, file_path: &str, _doc_type: &str) -> Result<Vec<Chunk>> {
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
        fn chunk(&self, _code: &str, _file_path: &str, _language: &str) -> Result<Vec<Chunk>> {
            Ok(vec![])
        }
    }

    struct FixedEmbeddingClient;
    #[async_trait]
    impl EmbeddingClient for FixedEmbeddingClient {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|_| Embedding { vector: vec![1.0, 0.0], model: "t".into(), dimensions: 2 })
                .collect())
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
        deleted: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl VectorStoreClient for RecordingVectorStore {
        async fn ensure_collection(&self, _: &str, _: usize, _: DistanceMetric) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &str, points: Vec<VectorPoint>) -> Result<()> {
            self.upserted.lock().unwrap().extend(points.into_iter().map(|p| p.id));
            Ok(())
        }
        async fn search(&self, _: &str, _: &[f32], _: usize, _: &VectorFilter, _: Option<f32>) -> Result<Vec<VectorSearchHit>> {
            Ok(vec![])
        }
        async fn delete(&self, _: &str, ids: &[String]) -> Result<()> {
            self.deleted.lock().unwrap().extend(ids.iter().cloned());
            Ok(())
        }
        async fn delete_by_filter(&self, _: &str, _: &VectorFilter) -> Result<()> {
            Ok(())
        }
        async fn scroll(&self, _: &str, _: Option<&str>, _: usize) -> Result<ScrollPage> {
            Ok(ScrollPage { points: vec![], next_cursor: None })
        }
        async fn set_payload(&self, _: &str, _: &[String], _: HashMap<String, serde_json::Value>) -> Result<()> {
            Ok(())
        }
        async fn collection_exists(&self, _: &str) -> Result<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct RecordingKeywordIndex {
        added: Mutex<Vec<String>>,
        deleted_paths: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl KeywordIndex for RecordingKeywordIndex {
        async fn add(&self, doc_id: &str, _: &str, _: &str, _: Option<&str>, _: &str, _: Option<&str>, _: bool) -> Result<()> {
            self.added.lock().unwrap().push(doc_id.to_string());
            Ok(())
        }
        async fn delete(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_by_file_path(&self, path: &str) -> Result<()> {
            self.deleted_paths.lock().unwrap().push(path.to_string());
            Ok(())
        }
        async fn search(&self, _: &str, _: usize, _: Option<&str>) -> Result<Vec<KeywordSearchHit>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct InMemoryStateStore {
        data: Mutex<HashMap<String, Vec<u8>>>,
    }
    #[async_trait]
    impl StateStoreProvider for InMemoryStateStore {
        async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
            self.data.lock().unwrap().insert(key.to_string(), data.to_vec());
            Ok(())
        }
        async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }
        async fn delete(&self, key: &str) -> Result<()> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn coordinator() -> (IngestionCoordinator, Arc<RecordingVectorStore>, Arc<RecordingKeywordIndex>) {
        let vector_store = Arc::new(RecordingVectorStore::default());
        let keyword_index = Arc::new(RecordingKeywordIndex::default());
        let coordinator = IngestionCoordinator::new(
            Arc::new(EchoChunker),
            Arc::new(NoopCodeChunker),
            Arc::new(FixedEmbeddingClient),
            vector_store.clone(),
            keyword_index.clone(),
            Arc::new(InMemoryStateStore::default()),
            "corpus",
        );
        (coordinator, vector_store, keyword_index)
    }

    #[tokio::test]
    async fn indexing_a_tree_dual_writes_every_chunk() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Title\n\nBody text").unwrap();
        let (coordinator, vector_store, keyword_index) = coordinator();

        let report = coordinator.index_tree(dir.path(), "u1", false).await.unwrap();
        assert_eq!(report.indexed, 1);
        assert_eq!(vector_store.upserted.lock().unwrap().len(), 1);
        assert_eq!(keyword_index.added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reindexing_unchanged_file_is_a_noop() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Title\n\nBody text").unwrap();
        let (coordinator, vector_store, _) = coordinator();

        coordinator.index_tree(dir.path(), "u1", false).await.unwrap();
        coordinator.index_tree(dir.path(), "u1", false).await.unwrap();
        assert_eq!(vector_store.upserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_file_removes_its_points_from_both_indexes() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("a.md");
        std::fs::write(&file_path, "# Title\n\nBody text").unwrap();
        let (coordinator, vector_store, keyword_index) = coordinator();
        coordinator.index_tree(dir.path(), "u1", false).await.unwrap();

        std::fs::remove_file(&file_path).unwrap();
        let report = coordinator.index_tree(dir.path(), "u1", false).await.unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(vector_store.deleted.lock().unwrap().len(), 1);
        assert_eq!(keyword_index.deleted_paths.lock().unwrap().len(), 1);
    }
}
