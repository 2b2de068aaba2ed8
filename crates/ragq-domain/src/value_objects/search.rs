//! Retrieval and citation value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chunk as returned by the retriever pipeline (C6), ready either to
/// display as a `/search` result or to feed into QA context assembly.
///
/// ## Ordering
///
/// Primary order is `rerank_score` when present, else `score`. Ties break
/// by `vector_score`, then by `id` lexicographically (see
/// `ragq_application::use_cases::retrieval`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// The chunk's deterministic id.
    pub id: String,
    /// Chunk content (enhanced content for embedding purposes, raw content
    /// for display — the retriever returns the field the caller asked for
    /// via its own projection, this struct always carries display content).
    pub content: String,
    /// Source file path.
    pub file_path: String,
    /// Fused score: `w_v * vector_score + w_k * keyword_score`.
    pub score: f32,
    /// Raw vector-search score, used as a fusion-tie-break key. `None` when
    /// the candidate came only from the keyword index.
    pub vector_score: Option<f32>,
    /// Raw keyword-search (BM25) score. `None` when the candidate came only
    /// from the vector store.
    pub keyword_score: Option<f32>,
    /// Cross-encoder score, set only when reranking ran.
    pub rerank_score: Option<f32>,
    /// Free-form payload carried through from the vector store (language,
    /// symbol, heading, owner tags, ...).
    pub metadata: Value,
}

impl RetrievedChunk {
    /// Sort key used for descending ordering: `(rerank_score or score,
    /// vector_score, id)`. Lower id sorts first among exact ties, matching
    /// "ties break ... by id lexicographically".
    pub fn sort_key(&self) -> (f32, f32, &str) {
        let primary = self.rerank_score.unwrap_or(self.score);
        (primary, self.vector_score.unwrap_or(0.0), self.id.as_str())
    }
}

/// The kind of evidence a [`Highlight`] is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// A verbatim contiguous substring match of at least 20 characters.
    Substring,
    /// A longest-common-subsequence-style similarity match scoring at
    /// least 0.6.
    Fuzzy,
}

/// One citation highlight: a span of the answer text that is attributable
/// to a specific retrieved source.
///
/// `ragq-server` renders this directly as part of `/query`'s `highlights`
/// field, per `utils/reference_highlighter.py` in the original system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    /// Index into the `sources` array this highlight cites.
    pub source_index: usize,
    /// Byte offset range into the answer text, `[start, end)`.
    pub answer_span: (usize, usize),
    /// How the match was established.
    pub match_kind: MatchKind,
    /// The similarity score backing this match (`1.0` for exact substring
    /// matches).
    pub score: f32,
}

/// The semantic-cache lookup key: question text scoped by group filter and
/// owner.
///
/// Two different owners asking the identical question never collide (see
/// property 12 in `SPEC_FULL.md` §8), because `owner_id` is part of the
/// fingerprint string that gets embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFingerprint {
    question: String,
    group_ids: Vec<String>,
    owner_id: String,
}

impl CacheFingerprint {
    /// Build a fingerprint, normalizing `group_ids` into sorted order so
    /// the same group set always yields the same fingerprint regardless of
    /// caller-supplied order.
    pub fn new(question: impl Into<String>, mut group_ids: Vec<String>, owner_id: impl Into<String>) -> Self {
        group_ids.sort();
        Self {
            question: question.into(),
            group_ids,
            owner_id: owner_id.into(),
        }
    }

    /// The canonical string fed to the embedding client:
    /// `question || "||groups:" || sort(group_ids) || "||user:" || owner_id`.
    pub fn as_str(&self) -> String {
        format!(
            "{}||groups:{}||user:{}",
            self.question,
            self.group_ids.join(","),
            self.owner_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_order_independent_over_group_ids() {
        let a = CacheFingerprint::new("q", vec!["b".into(), "a".into()], "u1");
        let b = CacheFingerprint::new("q", vec!["a".into(), "b".into()], "u1");
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn fingerprint_separates_by_owner() {
        let a = CacheFingerprint::new("q", vec![], "u1");
        let b = CacheFingerprint::new("q", vec![], "u2");
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn sort_key_prefers_rerank_score_over_fused_score() {
        let chunk = RetrievedChunk {
            id: "x".into(),
            content: String::new(),
            file_path: "f".into(),
            score: 0.5,
            vector_score: Some(0.9),
            keyword_score: None,
            rerank_score: Some(0.1),
            metadata: Value::Null,
        };
        assert_eq!(chunk.sort_key().0, 0.1);
    }
}
