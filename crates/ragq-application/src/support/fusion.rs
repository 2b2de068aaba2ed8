//! Hybrid vector/keyword score fusion (C6 step 3).

use ragq_domain::constants::{FUSION_KEYWORD_WEIGHT, FUSION_VECTOR_WEIGHT};
use ragq_domain::ports::providers::{KeywordSearchHit, VectorSearchHit};
use ragq_domain::value_objects::RetrievedChunk;
use std::collections::HashMap;

/// Combine vector and keyword results into one fused, descending-sorted
/// list. A candidate missing from one side contributes `0.0` for that
/// side, per §4.6 step 3.
pub fn fuse(
    vector_hits: Vec<VectorSearchHit>,
    keyword_hits: Vec<KeywordSearchHit>,
    vector_weight: f32,
    keyword_weight: f32,
) -> Vec<RetrievedChunk> {
    let mut by_id: HashMap<String, RetrievedChunk> = HashMap::new();

    for hit in vector_hits {
        let content = hit
            .payload
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let file_path = hit
            .payload
            .get("file_path")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        by_id.insert(
            hit.id.clone(),
            RetrievedChunk {
                id: hit.id,
                content,
                file_path,
                score: vector_weight * hit.score,
                vector_score: Some(hit.score),
                keyword_score: None,
                rerank_score: None,
                metadata: serde_json::Value::Object(
                    hit.payload.into_iter().collect::<serde_json::Map<_, _>>(),
                ),
            },
        );
    }

    for hit in keyword_hits {
        by_id
            .entry(hit.doc_id.clone())
            .and_modify(|existing| {
                existing.keyword_score = Some(hit.score);
                existing.score += keyword_weight * hit.score;
            })
            .or_insert_with(|| RetrievedChunk {
                id: hit.doc_id,
                content: String::new(),
                file_path: String::new(),
                score: keyword_weight * hit.score,
                vector_score: None,
                keyword_score: Some(hit.score),
                rerank_score: None,
                metadata: serde_json::Value::Null,
            });
    }

    let mut fused: Vec<RetrievedChunk> = by_id.into_values().collect();
    fused.sort_by(|a, b| {
        b.sort_key()
            .partial_cmp(&a.sort_key())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused
}

/// Default-weighted fusion, `w_v = 0.7, w_k = 0.3`.
pub fn fuse_default(
    vector_hits: Vec<VectorSearchHit>,
    keyword_hits: Vec<KeywordSearchHit>,
) -> Vec<RetrievedChunk> {
    fuse(
        vector_hits,
        keyword_hits,
        FUSION_VECTOR_WEIGHT,
        FUSION_KEYWORD_WEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn vhit(id: &str, score: f32) -> VectorSearchHit {
        let mut payload = StdHashMap::new();
        payload.insert("content".to_string(), serde_json::json!("c"));
        payload.insert("file_path".to_string(), serde_json::json!("f.rs"));
        VectorSearchHit {
            id: id.to_string(),
            score,
            payload,
        }
    }

    fn khit(id: &str, score: f32) -> KeywordSearchHit {
        KeywordSearchHit {
            doc_id: id.to_string(),
            score,
        }
    }

    #[test]
    fn keyword_weight_zero_equals_vector_only() {
        let fused = fuse(vec![vhit("a", 0.8)], vec![khit("a", 5.0)], 1.0, 0.0);
        assert_eq!(fused[0].score, 0.8);
    }

    #[test]
    fn vector_weight_zero_equals_keyword_only() {
        let fused = fuse(vec![vhit("a", 0.8)], vec![khit("a", 5.0)], 0.0, 1.0);
        assert_eq!(fused[0].score, 5.0);
    }

    #[test]
    fn missing_side_contributes_zero() {
        let fused = fuse_default(vec![], vec![khit("a", 10.0)]);
        assert_eq!(fused[0].score, FUSION_KEYWORD_WEIGHT * 10.0);
        assert!(fused[0].vector_score.is_none());
    }

    #[test]
    fn sorted_descending_by_fused_score() {
        let fused = fuse_default(vec![vhit("a", 0.2), vhit("b", 0.9)], vec![]);
        assert_eq!(fused[0].id, "b");
        assert_eq!(fused[1].id, "a");
    }
}
