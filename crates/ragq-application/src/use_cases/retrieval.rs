//! Hybrid retrieval: query rewriting, parallel vector/keyword search,
//! fusion, and reranking (C6).

use std::collections::HashMap;
use std::sync::Arc;

use ragq_domain::constants::RETRIEVER_RERANK_MULTIPLIER;
use ragq_domain::error::Result;
use ragq_domain::ports::providers::{
    EmbeddingClient, KeywordIndex, LlmCallOptions, LlmClient, LlmMessage, RerankCandidate,
    Reranker, VectorFilter, VectorStoreClient,
};
use ragq_domain::value_objects::{RetrievedChunk, RewriteStrategy, SearchFilters, TenantContext};

use crate::support::fuse_default;

/// Inputs to a single retrieval call.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    /// Natural-language question.
    pub question: String,
    /// Number of results to return after fusion/reranking.
    pub k: usize,
    /// Caller-supplied filters.
    pub filters: SearchFilters,
    /// Knowledge-group restriction, empty means no restriction.
    pub group_ids: Vec<String>,
    /// Requesting tenant, used to build the tenant predicate.
    pub tenant: TenantContext,
    /// Whether to run the cross-encoder reranking stage.
    pub use_reranker: bool,
    /// Query-rewrite strategy to apply before retrieval.
    pub rewrite: RewriteStrategy,
}

/// Number of LLM-generated variants requested under [`RewriteStrategy::MultiQuery`].
const MULTI_QUERY_VARIANTS: usize = 3;

/// Orchestrates C1 (embedding), C2 (vector store), C3 (keyword index), and
/// C4.8 (reranker) behind the C6 pipeline described in the specification's
/// retriever section: rewrite, gather, fuse, rerank.
pub struct HybridRetriever {
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStoreClient>,
    keyword_index: Arc<dyn KeywordIndex>,
    reranker: Option<Arc<dyn Reranker>>,
    llm_client: Option<Arc<dyn LlmClient>>,
    collection: String,
}

impl HybridRetriever {
    /// Build a retriever over the named vector-store collection. `reranker`
    /// and `llm_client` are optional: without a reranker, `use_reranker` is
    /// silently a no-op; without an LLM client, any non-`None` rewrite
    /// strategy falls back to the original query.
    pub fn new(
        embedding_client: Arc<dyn EmbeddingClient>,
        vector_store: Arc<dyn VectorStoreClient>,
        keyword_index: Arc<dyn KeywordIndex>,
        reranker: Option<Arc<dyn Reranker>>,
        llm_client: Option<Arc<dyn LlmClient>>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedding_client,
            vector_store,
            keyword_index,
            reranker,
            llm_client,
            collection: collection.into(),
        }
    }

    /// Run the full C6 pipeline, returning up to `query.k` results ordered
    /// per `RetrievedChunk::sort_key`.
    pub async fn search(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedChunk>> {
        let queries = self.rewrite(query).await;

        let candidate_count = if query.use_reranker && self.reranker.is_some() {
            query.k * RETRIEVER_RERANK_MULTIPLIER
        } else {
            query.k
        };

        let filter = self.build_filter(query);

        let mut vector_hits = Vec::new();
        for text in &queries {
            match self.embedding_client.encode(std::slice::from_ref(text)).await {
                Ok(embeddings) => {
                    if let Some(embedding) = embeddings.into_iter().next() {
                        match self
                            .vector_store
                            .search(
                                &self.collection,
                                &embedding.vector,
                                candidate_count,
                                &filter,
                                query.filters.min_score,
                            )
                            .await
                        {
                            Ok(hits) => vector_hits.extend(hits),
                            Err(err) => return Err(err),
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let keyword_hits = self
            .keyword_index
            .search(
                &query.question,
                candidate_count,
                query.filters.category.as_deref(),
            )
            .await
            .unwrap_or_default();

        let mut fused: Vec<RetrievedChunk> = fuse_default(vector_hits, keyword_hits)
            .into_iter()
            .filter(|chunk| self.is_visible(chunk, &query.tenant))
            .collect();
        fused.truncate(candidate_count);

        let reranked = if query.use_reranker {
            self.rerank(&query.question, fused).await
        } else {
            fused
        };

        let mut results = reranked;
        results.sort_by(|a, b| {
            b.sort_key()
                .partial_cmp(&a.sort_key())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(query.k);
        Ok(results)
    }

    /// Apply the query's rewrite strategy, returning one or more query
    /// strings to search with. Falls back to the original question on any
    /// failure, per the "rewriting is best-effort" contract.
    async fn rewrite(&self, query: &RetrievalQuery) -> Vec<String> {
        let Some(llm) = &self.llm_client else {
            return vec![query.question.clone()];
        };

        match query.rewrite {
            RewriteStrategy::None => vec![query.question.clone()],
            RewriteStrategy::MultiQuery => {
                let prompt = format!(
                    "Generate {MULTI_QUERY_VARIANTS} alternative phrasings of this question, one per line, no numbering: {}",
                    query.question
                );
                match llm
                    .complete(&[LlmMessage::user(prompt)], &LlmCallOptions::default())
                    .await
                {
                    Ok(response) => {
                        let mut variants: Vec<String> = response
                            .content
                            .lines()
                            .map(str::trim)
                            .filter(|line| !line.is_empty())
                            .map(str::to_string)
                            .collect();
                        variants.push(query.question.clone());
                        variants
                    }
                    Err(_) => vec![query.question.clone()],
                }
            }
            RewriteStrategy::Hyde => {
                let prompt = format!(
                    "Write a short hypothetical passage that would answer this question: {}",
                    query.question
                );
                match llm
                    .complete(&[LlmMessage::user(prompt)], &LlmCallOptions::default())
                    .await
                {
                    Ok(response) => vec![query.question.clone(), response.content],
                    Err(_) => vec![query.question.clone()],
                }
            }
        }
    }

    /// Build the conjunction of the tenant filter, group filter, and
    /// caller-supplied filters.
    /// Build the caller- and group-scoping filter passed to the vector
    /// store. The tenant predicate (`owner_id = me OR is_public = true`)
    /// is a disjunction across two fields, which [`VectorFilter`] cannot
    /// express as a single conjunctive clause — it is instead enforced
    /// post-hoc by [`Self::is_visible`] against every candidate the store
    /// returns.
    fn build_filter(&self, query: &RetrievalQuery) -> VectorFilter {
        let mut filter = VectorFilter::none();

        if !query.group_ids.is_empty() {
            filter.must_any_of.insert(
                "group_id".to_string(),
                query.group_ids.iter().map(|id| serde_json::json!(id)).collect(),
            );
        }

        if let Some(chunk_type) = &query.filters.chunk_type {
            filter.must.insert("type".to_string(), serde_json::json!(chunk_type));
        }
        if let Some(language) = &query.filters.language {
            filter.must.insert("language".to_string(), serde_json::json!(language));
        }

        filter
    }

    /// Post-hoc tenant check, defense in depth against a vector-store
    /// filter that was not applied (e.g. the in-memory test double).
    fn is_visible(&self, chunk: &RetrievedChunk, tenant: &TenantContext) -> bool {
        let owner_id = chunk
            .metadata
            .get("owner_id")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let is_public = chunk
            .metadata
            .get("is_public")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        tenant.can_see(owner_id, is_public)
    }

    /// Rerank `candidates` against `query`, logging and falling back to the
    /// fusion order on any reranker failure.
    async fn rerank(&self, query: &str, candidates: Vec<RetrievedChunk>) -> Vec<RetrievedChunk> {
        let Some(reranker) = &self.reranker else {
            return candidates;
        };

        let rerank_candidates: Vec<RerankCandidate> = candidates
            .iter()
            .map(|chunk| RerankCandidate {
                id: chunk.id.clone(),
                content: chunk.content.clone(),
            })
            .collect();

        match reranker
            .rerank(query, rerank_candidates, candidates.len())
            .await
        {
            Ok(reranked) => {
                let mut by_id: HashMap<String, RetrievedChunk> =
                    candidates.into_iter().map(|c| (c.id.clone(), c)).collect();
                reranked
                    .into_iter()
                    .filter_map(|result| {
                        by_id.remove(&result.id).map(|mut chunk| {
                            chunk.rerank_score = Some(result.score);
                            chunk
                        })
                    })
                    .collect()
            }
            Err(_) => candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragq_domain::ports::providers::{DistanceMetric, KeywordSearchHit, ScrollPage, VectorSearchHit};
    use ragq_domain::value_objects::Embedding;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    struct FixedEmbeddingClient;

    #[async_trait]
    impl EmbeddingClient for FixedEmbeddingClient {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|_| Embedding {
                    vector: vec![1.0, 0.0],
                    model: "test".into(),
                    dimensions: 2,
                })
                .collect())
        }

        fn dimension(&self) -> Option<usize> {
            Some(2)
        }

        fn max_batch_size(&self) -> usize {
            16
        }
    }

    struct FakeVectorStore {
        hits: Vec<VectorSearchHit>,
    }

    #[async_trait]
    impl VectorStoreClient for FakeVectorStore {
        async fn ensure_collection(&self, _: &str, _: usize, _: DistanceMetric) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &str, _: Vec<ragq_domain::ports::providers::VectorPoint>) -> Result<()> {
            Ok(())
        }
        async fn search(
            &self,
            _collection: &str,
            _query_vector: &[f32],
            k: usize,
            _filter: &VectorFilter,
            _min_score: Option<f32>,
        ) -> Result<Vec<VectorSearchHit>> {
            Ok(self.hits.iter().take(k).cloned().collect())
        }
        async fn delete(&self, _: &str, _: &[String]) -> Result<()> {
            Ok(())
        }
        async fn delete_by_filter(&self, _: &str, _: &VectorFilter) -> Result<()> {
            Ok(())
        }
        async fn scroll(&self, _: &str, _: Option<&str>, _: usize) -> Result<ScrollPage> {
            Ok(ScrollPage {
                points: vec![],
                next_cursor: None,
            })
        }
        async fn set_payload(&self, _: &str, _: &[String], _: StdHashMap<String, serde_json::Value>) -> Result<()> {
            Ok(())
        }
        async fn collection_exists(&self, _: &str) -> Result<bool> {
            Ok(true)
        }
    }

    struct EmptyKeywordIndex;

    #[async_trait]
    impl KeywordIndex for EmptyKeywordIndex {
        async fn add(&self, _: &str, _: &str, _: &str, _: Option<&str>, _: &str, _: Option<&str>, _: bool) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_by_file_path(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn search(&self, _: &str, _: usize, _: Option<&str>) -> Result<Vec<KeywordSearchHit>> {
            Ok(vec![])
        }
    }

    struct FailingReranker {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl Reranker for FailingReranker {
        async fn rerank(
            &self,
            _query: &str,
            _candidates: Vec<RerankCandidate>,
            _k: usize,
        ) -> Result<Vec<ragq_domain::ports::providers::RerankResult>> {
            *self.calls.lock().unwrap() += 1;
            Err(ragq_domain::Error::unavailable("reranker model not loaded"))
        }
    }

    fn hit(id: &str, score: f32, owner_id: &str, is_public: bool) -> VectorSearchHit {
        let mut payload = StdHashMap::new();
        payload.insert("content".into(), serde_json::json!(format!("content for {id}")));
        payload.insert("file_path".into(), serde_json::json!("f.rs"));
        payload.insert("owner_id".into(), serde_json::json!(owner_id));
        payload.insert("is_public".into(), serde_json::json!(is_public));
        VectorSearchHit {
            id: id.into(),
            score,
            payload,
        }
    }

    fn retriever(hits: Vec<VectorSearchHit>, reranker: Option<Arc<dyn Reranker>>) -> HybridRetriever {
        HybridRetriever::new(
            Arc::new(FixedEmbeddingClient),
            Arc::new(FakeVectorStore { hits }),
            Arc::new(EmptyKeywordIndex),
            reranker,
            None,
            "corpus",
        )
    }

    fn query(k: usize, owner_id: &str, use_reranker: bool) -> RetrievalQuery {
        RetrievalQuery {
            question: "what does make do".into(),
            k,
            filters: SearchFilters::default(),
            group_ids: vec![],
            tenant: TenantContext {
                owner_id: owner_id.into(),
                is_admin: false,
            },
            use_reranker,
            rewrite: RewriteStrategy::None,
        }
    }

    #[tokio::test]
    async fn tenant_isolation_drops_other_owners_private_chunks() {
        let hits = vec![
            hit("mine", 0.9, "u1", false),
            hit("theirs", 0.8, "u2", false),
        ];
        let retriever = retriever(hits, None);
        let results = retriever.search(&query(10, "u1", false)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "mine");
    }

    #[tokio::test]
    async fn public_chunks_are_visible_to_every_tenant() {
        let hits = vec![hit("shared", 0.9, "u2", true)];
        let retriever = retriever(hits, None);
        let results = retriever.search(&query(10, "u1", false)).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn monotonic_k_prefix_without_reranking() {
        let hits = vec![
            hit("a", 0.9, "u1", true),
            hit("b", 0.7, "u1", true),
            hit("c", 0.5, "u1", true),
        ];
        let retriever = retriever(hits, None);
        let top1 = retriever.search(&query(1, "u1", false)).await.unwrap();
        let top3 = retriever.search(&query(3, "u1", false)).await.unwrap();
        assert_eq!(top1[0].id, top3[0].id);
    }

    #[tokio::test]
    async fn reranker_failure_falls_back_to_fusion_order() {
        let hits = vec![hit("a", 0.9, "u1", true), hit("b", 0.7, "u1", true)];
        let reranker = Arc::new(FailingReranker { calls: Mutex::new(0) });
        let retriever = retriever(hits, Some(reranker.clone()));
        let results = retriever.search(&query(2, "u1", true)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(*reranker.calls.lock().unwrap(), 1);
    }
}
