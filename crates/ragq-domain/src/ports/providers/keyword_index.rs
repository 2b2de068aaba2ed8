//! Keyword Index Port (C3)

use crate::error::Result;
use async_trait::async_trait;

/// One ranked result from [`KeywordIndex::search`].
#[derive(Debug, Clone)]
pub struct KeywordSearchHit {
    /// The matched document id.
    pub doc_id: String,
    /// BM25-style score, a positive number comparable within one query.
    pub score: f32,
}

/// A full-text index over chunks, BM25-style, with CJK-aware tokenization.
///
/// Implementations detect CJK content before indexing and pre-segment it
/// with a word segmenter; non-CJK content goes through a Porter-like
/// stemming tokenizer instead.
#[async_trait]
pub trait KeywordIndex: Send + Sync {
    /// Index or re-index a document. Upserting the same `doc_id` twice is
    /// idempotent — the second call replaces the first's postings.
    async fn add(
        &self,
        doc_id: &str,
        content: &str,
        title: &str,
        category: Option<&str>,
        file_path: &str,
        owner_id: Option<&str>,
        is_public: bool,
    ) -> Result<()>;

    /// Remove a document by id.
    async fn delete(&self, doc_id: &str) -> Result<()>;

    /// Remove every document indexed from a given source file path.
    async fn delete_by_file_path(&self, file_path: &str) -> Result<()>;

    /// Find the `k` highest-scoring documents for `query`, optionally
    /// restricted to `category`.
    async fn search(
        &self,
        query: &str,
        k: usize,
        category: Option<&str>,
    ) -> Result<Vec<KeywordSearchHit>>;
}
