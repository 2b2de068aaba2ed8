//! Reranker Port (4.8)

use crate::error::Result;
use async_trait::async_trait;

/// A candidate passed into [`Reranker::rerank`].
#[derive(Debug, Clone)]
pub struct RerankCandidate {
    /// The candidate's id.
    pub id: String,
    /// The text the cross-encoder scores against the query.
    pub content: String,
}

/// One reranked result.
#[derive(Debug, Clone)]
pub struct RerankResult {
    /// The candidate's id.
    pub id: String,
    /// Cross-encoder score for `(query, candidate)`.
    pub score: f32,
}

/// A cross-encoder that jointly scores `(query, candidate)` pairs.
///
/// Implementations lazily load their model on first call; concurrent
/// initialization attempts must serialize so only one load occurs, and a
/// load failure must be sticky — every later call short-circuits to
/// pass-through (return the input order, unscored).
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score and reorder `candidates` against `query`, truncated to `k`.
    /// Returns `candidates` unchanged, in input order, if the model failed
    /// to load or reranking is otherwise unavailable.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        k: usize,
    ) -> Result<Vec<RerankResult>>;
}
