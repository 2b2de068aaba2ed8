//! Cache entries for the semantic answer cache (4.9) and the reranker
//! LRU+TTL cache (4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::search::RetrievedChunk;

/// A cached QA answer, keyed by a fingerprint embedding of the question
/// plus its tenant/group scope.
///
/// Stored as a point in a dedicated vector-store collection; the point's
/// vector is the embedding of [`crate::value_objects::search::CacheFingerprint::as_str`],
/// and the payload is this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticCacheEntry {
    /// The original question text.
    pub question: String,
    /// The cached answer text.
    pub answer: String,
    /// The sources the original answer was grounded in.
    pub sources: Vec<RetrievedChunk>,
    /// When this entry was written.
    pub created_at: DateTime<Utc>,
    /// Number of times this entry has been served as a hit.
    pub hit_count: u64,
    /// When this entry was last served as a hit.
    pub last_hit_at: Option<DateTime<Utc>>,
}

/// One candidate's reranked position within a cached reranker result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankedCandidate {
    /// The candidate's chunk or point id.
    pub id: String,
    /// Cross-encoder score for `(query, candidate)`.
    pub rerank_score: f32,
}

/// A cached cross-encoder reranking result.
///
/// Keyed by `hash(query || sorted candidate ids)`. LRU-evicted and
/// TTL-expired by the owning `moka::future::Cache`; this struct is the
/// cached value, not the cache itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankerCacheEntry {
    /// The query the candidates were scored against.
    pub query: String,
    /// Candidates in final reranked order.
    pub ordered: Vec<RerankedCandidate>,
    /// When this entry was computed, used for TTL expiry accounting in
    /// tests and diagnostics (the cache itself also tracks TTL natively).
    pub computed_at: DateTime<Utc>,
}
