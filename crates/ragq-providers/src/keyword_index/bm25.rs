//! In-process BM25 inverted index.
//!
//! Grounded on the postings-list shape of `rank-retrieve`'s `InvertedIndex`
//! (`postings` keyed by term, `doc_frequencies`, an incrementally maintained
//! `avg_doc_length`) rather than the simpler rescan-every-query scorer this
//! workspace's teacher repo uses for hybrid search — that scorer has no
//! notion of per-document identity, so it can't support `delete` or
//! `delete_by_file_path`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use ragq_domain::constants::{BM25_B, BM25_K1};
use ragq_domain::error::Result;
use ragq_domain::ports::providers::keyword_index::{KeywordIndex, KeywordSearchHit};

use super::tokenize::tokenize;

struct Document {
    term_counts: HashMap<String, u32>,
    length: usize,
    category: Option<String>,
    file_path: String,
    #[allow(dead_code)]
    owner_id: Option<String>,
    #[allow(dead_code)]
    is_public: bool,
}

#[derive(Default)]
struct Index {
    documents: HashMap<String, Document>,
    /// term -> doc_id -> term frequency in that doc.
    postings: HashMap<String, HashMap<String, u32>>,
    total_length: usize,
}

impl Index {
    fn avg_doc_length(&self) -> f32 {
        if self.documents.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.documents.len() as f32
        }
    }

    fn doc_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map(HashMap::len).unwrap_or(0)
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.documents.len() as f32;
        let df = self.doc_frequency(term) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn remove(&mut self, doc_id: &str) {
        if let Some(doc) = self.documents.remove(doc_id) {
            self.total_length -= doc.length;
            for term in doc.term_counts.keys() {
                if let Some(posting) = self.postings.get_mut(term) {
                    posting.remove(doc_id);
                    if posting.is_empty() {
                        self.postings.remove(term);
                    }
                }
            }
        }
    }

    fn insert(
        &mut self,
        doc_id: String,
        content: &str,
        title: &str,
        category: Option<String>,
        file_path: String,
        owner_id: Option<String>,
        is_public: bool,
    ) {
        self.remove(&doc_id);

        let tokens = tokenize(&format!("{title} {content}"));
        let length = tokens.len();

        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *term_counts.entry(token).or_insert(0) += 1;
        }

        for (term, count) in &term_counts {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(doc_id.clone(), *count);
        }

        self.total_length += length;
        self.documents.insert(
            doc_id,
            Document {
                term_counts,
                length,
                category,
                file_path,
                owner_id,
                is_public,
            },
        );
    }

    fn score(&self, doc_id: &str, query_terms: &[String]) -> f32 {
        let Some(doc) = self.documents.get(doc_id) else {
            return 0.0;
        };

        let avg_len = self.avg_doc_length();
        let mut score = 0.0;

        for term in query_terms {
            let Some(&tf) = doc.term_counts.get(term) else {
                continue;
            };
            let tf = tf as f32;
            let idf = self.idf(term);
            let denom = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * doc.length as f32 / avg_len.max(1.0));
            score += idf * (tf * (BM25_K1 + 1.0)) / denom;
        }

        score
    }
}

/// `KeywordIndex` over an in-process BM25 inverted index, guarded by an
/// `RwLock` since `add`/`delete` are rare compared to `search`.
#[derive(Default)]
pub struct Bm25Index {
    inner: RwLock<Index>,
}

impl Bm25Index {
    /// Build an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeywordIndex for Bm25Index {
    async fn add(
        &self,
        doc_id: &str,
        content: &str,
        title: &str,
        category: Option<&str>,
        file_path: &str,
        owner_id: Option<&str>,
        is_public: bool,
    ) -> Result<()> {
        let mut index = self.inner.write().expect("bm25 index lock poisoned");
        index.insert(
            doc_id.to_string(),
            content,
            title,
            category.map(str::to_string),
            file_path.to_string(),
            owner_id.map(str::to_string),
            is_public,
        );
        Ok(())
    }

    async fn delete(&self, doc_id: &str) -> Result<()> {
        let mut index = self.inner.write().expect("bm25 index lock poisoned");
        index.remove(doc_id);
        Ok(())
    }

    async fn delete_by_file_path(&self, file_path: &str) -> Result<()> {
        let mut index = self.inner.write().expect("bm25 index lock poisoned");
        let matching: Vec<String> = index
            .documents
            .iter()
            .filter(|(_, doc)| doc.file_path == file_path)
            .map(|(doc_id, _)| doc_id.clone())
            .collect();
        for doc_id in matching {
            index.remove(&doc_id);
        }
        Ok(())
    }

    async fn search(&self, query: &str, k: usize, category: Option<&str>) -> Result<Vec<KeywordSearchHit>> {
        let index = self.inner.read().expect("bm25 index lock poisoned");
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: HashMap<String, ()> = HashMap::new();
        for term in &query_terms {
            if let Some(posting) = index.postings.get(term) {
                for doc_id in posting.keys() {
                    candidates.insert(doc_id.clone(), ());
                }
            }
        }

        let mut hits: Vec<KeywordSearchHit> = candidates
            .into_keys()
            .filter(|doc_id| match (category, index.documents.get(doc_id)) {
                (Some(wanted), Some(doc)) => doc.category.as_deref() == Some(wanted),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .map(|doc_id| {
                let score = index.score(&doc_id, &query_terms);
                KeywordSearchHit { doc_id, score }
            })
            .filter(|hit| hit.score > 0.0)
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_ranks_exact_term_match_highest() {
        let index = Bm25Index::new();
        index
            .add("doc1", "the quick brown fox jumps", "fox", None, "fox.md", None, true)
            .await
            .unwrap();
        index
            .add("doc2", "a slow turtle crawls along", "turtle", None, "turtle.md", None, true)
            .await
            .unwrap();

        let hits = index.search("fox", 10, None).await.unwrap();
        assert_eq!(hits[0].doc_id, "doc1");
    }

    #[tokio::test]
    async fn delete_removes_document_from_results() {
        let index = Bm25Index::new();
        index
            .add("doc1", "rust programming language", "rust", None, "rust.md", None, true)
            .await
            .unwrap();
        index.delete("doc1").await.unwrap();

        let hits = index.search("rust", 10, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn delete_by_file_path_removes_every_matching_document() {
        let index = Bm25Index::new();
        index
            .add("doc1", "alpha content", "alpha", None, "shared.md", None, true)
            .await
            .unwrap();
        index
            .add("doc2", "alpha content again", "alpha", None, "shared.md", None, true)
            .await
            .unwrap();
        index.delete_by_file_path("shared.md").await.unwrap();

        let hits = index.search("alpha", 10, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn category_filter_excludes_non_matching_documents() {
        let index = Bm25Index::new();
        index
            .add("doc1", "database indexing", "db", Some("backend"), "db.md", None, true)
            .await
            .unwrap();
        index
            .add("doc2", "database migrations", "db", Some("ops"), "ops.md", None, true)
            .await
            .unwrap();

        let hits = index.search("database", 10, Some("backend")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "doc1");
    }

    #[tokio::test]
    async fn reindexing_same_doc_id_replaces_postings() {
        let index = Bm25Index::new();
        index
            .add("doc1", "first version", "v1", None, "f.md", None, true)
            .await
            .unwrap();
        index
            .add("doc1", "second revision", "v2", None, "f.md", None, true)
            .await
            .unwrap();

        let hits = index.search("first", 10, None).await.unwrap();
        assert!(hits.is_empty());
        let hits = index.search("revision", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
