//! HTTP cross-encoder reranker with an LRU+TTL score cache.
//!
//! The cache shape (bounded entry count, time-based expiry) follows the
//! teacher's `moka`-backed cache adapter; what's new here is the "sticky
//! unavailable" flag the port requires: once the cross-encoder endpoint
//! fails once, every later call skips the network entirely and returns
//! candidates unscored in their input order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use sha2::{Digest, Sha256};

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::reranker::{RerankCandidate, RerankResult, Reranker};

use crate::constants::{
    CONTENT_TYPE_JSON, HTTP_REQUEST_TIMEOUT_SECS, RERANKER_CACHE_MAX_ENTRIES, RERANKER_CACHE_TTL_SECS,
};
use crate::utils::check_and_parse;

fn cache_key(query: &str, candidate_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b"\0");
    hasher.update(candidate_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cross-encoder reranker calling a remote scoring endpoint, with per-pair
/// scores cached and a sticky unavailability flag once the endpoint fails.
pub struct CachingCrossEncoderReranker {
    base_url: String,
    api_key: Option<String>,
    http: Client,
    cache: Cache<String, f32>,
    unavailable: AtomicBool,
}

impl CachingCrossEncoderReranker {
    /// Build a reranker client against `base_url`, a cross-encoder scoring
    /// endpoint accepting `{"query", "documents": [...]}}` and returning
    /// `{"scores": [...]}` in input order.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builder should not fail with static config");

        let cache = Cache::builder()
            .max_capacity(RERANKER_CACHE_MAX_ENTRIES)
            .time_to_live(Duration::from_secs(RERANKER_CACHE_TTL_SECS))
            .build();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
            cache,
            unavailable: AtomicBool::new(false),
        }
    }

    async fn score_uncached(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
        let mut request = self
            .http
            .post(format!("{}/rerank", self.base_url))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .json(&serde_json::json!({"query": query, "documents": documents}));

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network_with_source("reranker request failed", e))?;

        let body = check_and_parse(response, "reranker").await?;
        let scores = body["scores"]
            .as_array()
            .ok_or_else(|| Error::upstream("reranker response missing scores array"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect::<Vec<_>>();

        if scores.len() != documents.len() {
            return Err(Error::upstream(format!(
                "reranker returned {} scores for {} documents",
                scores.len(),
                documents.len()
            )));
        }

        Ok(scores)
    }

    fn pass_through(candidates: Vec<RerankCandidate>, k: usize) -> Vec<RerankResult> {
        candidates
            .into_iter()
            .take(k)
            .map(|c| RerankResult { id: c.id, score: 0.0 })
            .collect()
    }
}

#[async_trait]
impl Reranker for CachingCrossEncoderReranker {
    async fn rerank(&self, query: &str, candidates: Vec<RerankCandidate>, k: usize) -> Result<Vec<RerankResult>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if self.unavailable.load(Ordering::Relaxed) {
            return Ok(Self::pass_through(candidates, k));
        }

        let mut scores = vec![None; candidates.len()];
        let mut misses = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let key = cache_key(query, &candidate.id);
            if let Some(score) = self.cache.get(&key).await {
                scores[i] = Some(score);
            } else {
                misses.push(i);
            }
        }

        if !misses.is_empty() {
            let documents: Vec<String> = misses.iter().map(|&i| candidates[i].content.clone()).collect();
            match self.score_uncached(query, &documents).await {
                Ok(fresh_scores) => {
                    for (&i, score) in misses.iter().zip(fresh_scores) {
                        let key = cache_key(query, &candidates[i].id);
                        self.cache.insert(key, score).await;
                        scores[i] = Some(score);
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cross-encoder reranker unavailable, falling back to pass-through");
                    self.unavailable.store(true, Ordering::Relaxed);
                    return Ok(Self::pass_through(candidates, k));
                }
            }
        }

        let mut results: Vec<RerankResult> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| RerankResult {
                id: candidate.id,
                score: score.unwrap_or(0.0),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_distinguishes_candidate_ids() {
        let a = cache_key("query", "doc1");
        let b = cache_key("query", "doc2");
        assert_ne!(a, b);
    }

    #[test]
    fn cache_key_is_deterministic() {
        let a = cache_key("query", "doc1");
        let b = cache_key("query", "doc1");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn pass_through_preserves_input_order_and_truncates() {
        let candidates = vec![
            RerankCandidate { id: "a".into(), content: "x".into() },
            RerankCandidate { id: "b".into(), content: "y".into() },
            RerankCandidate { id: "c".into(), content: "z".into() },
        ];
        let results = CachingCrossEncoderReranker::pass_through(candidates, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "b");
    }
}
