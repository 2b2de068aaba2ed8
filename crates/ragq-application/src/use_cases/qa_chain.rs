//! QA orchestration: context budgeting, history, LLM call with retry,
//! citation highlighting, and the semantic answer cache (C7).

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;

use ragq_domain::constants::{LLM_MAX_RETRIES, SEMANTIC_CACHE_SIMILARITY_THRESHOLD};
use ragq_domain::entities::{RequestKind, SemanticCacheEntry, UsageLog};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::{
    DistanceMetric, EmbeddingClient, LlmCallOptions, LlmClient, LlmMessage, LlmUsage,
    VectorFilter, VectorPoint, VectorStoreClient,
};
use ragq_domain::ports::repositories::UsageRepository;
use ragq_domain::value_objects::{
    CacheFingerprint, Highlight, RetrievedChunk, RewriteStrategy, SearchFilters, TenantContext,
};

use crate::support::{assemble, highlight, ConversationHistory};
use crate::use_cases::retrieval::{HybridRetriever, RetrievalQuery};

const SYSTEM_PROMPT: &str = "You are a question-answering assistant over an indexed corpus. \
Ground every statement in the provided context. If the context does not contain the answer, \
say so explicitly instead of guessing. Cite source file paths inline where relevant.";

/// Inputs to a single `/query` call.
#[derive(Debug, Clone)]
pub struct QueryInput {
    /// Natural-language question.
    pub question: String,
    /// Number of sources to retrieve.
    pub k: usize,
    /// Caller-supplied retrieval filters.
    pub filters: SearchFilters,
    /// Knowledge-group restriction.
    pub group_ids: Vec<String>,
    /// Requesting tenant.
    pub tenant: TenantContext,
    /// Whether to fold in conversation history.
    pub use_history: bool,
    /// Whether to consult the semantic cache.
    pub use_cache: bool,
    /// Whether to run the reranker.
    pub use_reranker: bool,
    /// Query-rewrite strategy.
    pub rewrite: RewriteStrategy,
}

/// The result of a non-streaming `/query` call.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    /// The synthesized answer.
    pub answer: String,
    /// Sources the answer was grounded in.
    pub sources: Vec<RetrievedChunk>,
    /// Token accounting for the LLM call (zeroed on a cache hit).
    pub usage: LlmUsage,
    /// Citation highlights over `answer`.
    pub highlights: Vec<Highlight>,
    /// Whether this answer came from the semantic cache.
    pub from_cache: bool,
}

/// One event of the `/query/stream` SSE schema.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Emitted once, before any `Chunk`.
    Sources(Vec<RetrievedChunk>),
    /// A partial-answer delta.
    Chunk(String),
    /// Terminal event carrying the full accumulated answer.
    Done(String),
    /// Terminal-adjacent event on failure; a `Done` with the accumulated
    /// text so far still follows, per the streaming-error contract.
    Error(String),
}

/// Orchestrates retrieval, context assembly, the LLM call, citation
/// highlighting, and the semantic cache.
pub struct QaChain {
    retriever: Arc<HybridRetriever>,
    llm_client: Arc<dyn LlmClient>,
    embedding_client: Arc<dyn EmbeddingClient>,
    cache_store: Arc<dyn VectorStoreClient>,
    usage_repository: Arc<dyn UsageRepository>,
    cache_collection: String,
    provider: String,
    model: String,
}

impl QaChain {
    /// Construct a chain wired to its retriever and the semantic-cache
    /// collection (a dedicated collection in the same vector store, per
    /// §4.9).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        retriever: Arc<HybridRetriever>,
        llm_client: Arc<dyn LlmClient>,
        embedding_client: Arc<dyn EmbeddingClient>,
        cache_store: Arc<dyn VectorStoreClient>,
        usage_repository: Arc<dyn UsageRepository>,
        cache_collection: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            llm_client,
            embedding_client,
            cache_store,
            usage_repository,
            cache_collection: cache_collection.into(),
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Run the non-streaming `/query` pipeline.
    pub async fn query(
        &self,
        input: &QueryInput,
        history: &mut ConversationHistory,
    ) -> Result<QueryOutput> {
        let start = std::time::Instant::now();
        let fingerprint = self.fingerprint(input);

        if input.use_cache {
            if let Some(cached) = self.cache_get(&fingerprint).await {
                return Ok(QueryOutput {
                    answer: cached.answer,
                    sources: cached.sources,
                    usage: LlmUsage::default(),
                    highlights: vec![],
                    from_cache: true,
                });
            }
        }

        let sources = self.retrieve(input).await?;
        let messages = self.build_messages(input, &sources, history);
        let response = self.call_with_retry(&messages).await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.record_usage(input, "", LlmUsage::default(), sources.len(), input.use_reranker, false, Some(&err))
                    .await;
                return Err(err);
            }
        };

        let highlights = highlight(&response.content, &sources);

        self.record_usage(
            input,
            &response.content,
            response.usage,
            sources.len(),
            input.use_reranker,
            true,
            None,
        )
        .await;

        if input.use_history {
            history.push(input.question.clone(), response.content.clone());
        }

        if input.use_cache {
            self.cache_set(&fingerprint, &input.question, &response.content, &sources)
                .await;
        }

        let _ = start;
        Ok(QueryOutput {
            answer: response.content,
            sources,
            usage: response.usage,
            highlights,
            from_cache: false,
        })
    }

    /// Run the streaming `/query/stream` pipeline: `Sources` → `Chunk`* →
    /// `Done`, with the cache write happening only after a successful
    /// stream completion.
    pub fn query_stream(
        self: Arc<Self>,
        input: QueryInput,
    ) -> BoxStream<'static, StreamEvent> {
        Box::pin(stream! {
            let fingerprint = self.fingerprint(&input);

            if input.use_cache {
                if let Some(cached) = self.cache_get(&fingerprint).await {
                    yield StreamEvent::Sources(cached.sources);
                    yield StreamEvent::Chunk(cached.answer.clone());
                    yield StreamEvent::Done(cached.answer);
                    return;
                }
            }

            let sources = match self.retrieve(&input).await {
                Ok(sources) => sources,
                Err(err) => {
                    yield StreamEvent::Error(err.to_string());
                    yield StreamEvent::Done(String::new());
                    return;
                }
            };
            yield StreamEvent::Sources(sources.clone());

            let mut history = ConversationHistory::default();
            let messages = self.build_messages(&input, &sources, &mut history);

            let mut accumulated = String::new();
            match self.llm_client.stream(&messages, &LlmCallOptions::default()).await {
                Ok(mut deltas) => {
                    while let Some(delta) = deltas.next().await {
                        match delta {
                            Ok(text) => {
                                accumulated.push_str(&text);
                                yield StreamEvent::Chunk(text);
                            }
                            Err(err) => {
                                yield StreamEvent::Error(err.to_string());
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    yield StreamEvent::Error(err.to_string());
                }
            }

            if input.use_cache && !accumulated.is_empty() {
                self.cache_set(&fingerprint, &input.question, &accumulated, &sources).await;
            }

            yield StreamEvent::Done(accumulated);
        })
    }

    async fn retrieve(&self, input: &QueryInput) -> Result<Vec<RetrievedChunk>> {
        let query = RetrievalQuery {
            question: input.question.clone(),
            k: input.k,
            filters: input.filters.clone(),
            group_ids: input.group_ids.clone(),
            tenant: input.tenant.clone(),
            use_reranker: input.use_reranker,
            rewrite: input.rewrite,
        };
        self.retriever.search(&query).await
    }

    fn build_messages(
        &self,
        input: &QueryInput,
        sources: &[RetrievedChunk],
        history: &mut ConversationHistory,
    ) -> Vec<LlmMessage> {
        let assembled = assemble(sources);
        let mut messages = vec![LlmMessage::system(SYSTEM_PROMPT)];

        if input.use_history {
            messages.extend(history.to_messages());
        }

        messages.push(LlmMessage::user(format!(
            "Context:\n{}\n\nQuestion: {}",
            assembled.text, input.question
        )));
        messages
    }

    /// Invoke the LLM client, retrying up to `LLM_MAX_RETRIES` times on
    /// retryable failures (upstream 5xx, timeouts, WAF-like blocks) with
    /// randomized exponential backoff and an incrementing attempt counter.
    async fn call_with_retry(
        &self,
        messages: &[LlmMessage],
    ) -> Result<ragq_domain::ports::providers::LlmResponse> {
        let mut last_err = None;
        for attempt in 0..=LLM_MAX_RETRIES {
            let options = LlmCallOptions {
                attempt,
                ..LlmCallOptions::default()
            };
            match self.llm_client.complete(messages, &options).await {
                Ok(response) => return Ok(response),
                Err(err) if Self::is_retryable(&err) && attempt < LLM_MAX_RETRIES => {
                    let backoff_ms = 100u64 * 2u64.pow(attempt) + rand::random::<u64>() % 100;
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::upstream("llm call exhausted retries")))
    }

    /// Upstream-transient failures are retryable; everything else is not.
    fn is_retryable(err: &Error) -> bool {
        matches!(err, Error::Upstream { .. } | Error::Network { .. })
    }

    fn fingerprint(&self, input: &QueryInput) -> CacheFingerprint {
        CacheFingerprint::new(
            input.question.clone(),
            input.group_ids.clone(),
            input.tenant.owner_id.clone(),
        )
    }

    async fn cache_get(&self, fingerprint: &CacheFingerprint) -> Option<SemanticCacheEntry> {
        let embedding = self
            .embedding_client
            .encode(std::slice::from_ref(&fingerprint.as_str()))
            .await
            .ok()?
            .into_iter()
            .next()?;

        let hits = self
            .cache_store
            .search(
                &self.cache_collection,
                &embedding.vector,
                1,
                &VectorFilter::none(),
                Some(SEMANTIC_CACHE_SIMILARITY_THRESHOLD),
            )
            .await
            .ok()?;

        let hit = hits.into_iter().next()?;
        let entry: SemanticCacheEntry = serde_json::from_value(serde_json::Value::Object(
            hit.payload.into_iter().collect(),
        ))
        .ok()?;
        Some(entry)
    }

    async fn cache_set(
        &self,
        fingerprint: &CacheFingerprint,
        question: &str,
        answer: &str,
        sources: &[RetrievedChunk],
    ) {
        let Ok(embeddings) = self
            .embedding_client
            .encode(std::slice::from_ref(&fingerprint.as_str()))
            .await
        else {
            return;
        };
        let Some(embedding) = embeddings.into_iter().next() else {
            return;
        };

        let entry = SemanticCacheEntry {
            question: question.to_string(),
            answer: answer.to_string(),
            sources: sources.to_vec(),
            created_at: Utc::now(),
            hit_count: 0,
            last_hit_at: None,
        };

        let Ok(payload_value) = serde_json::to_value(&entry) else {
            return;
        };
        let serde_json::Value::Object(payload) = payload_value else {
            return;
        };

        let id = {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(question.as_bytes());
            hex::encode(hasher.finalize())
        };

        let _ = self
            .cache_store
            .ensure_collection(&self.cache_collection, embedding.vector.len(), DistanceMetric::Cosine)
            .await;
        let _ = self
            .cache_store
            .upsert(
                &self.cache_collection,
                vec![VectorPoint {
                    id,
                    vector: embedding.vector,
                    payload: payload.into_iter().collect(),
                }],
            )
            .await;
    }

    /// Usage-log writes are best-effort (§7 propagation policy: recover
    /// locally).
    #[allow(clippy::too_many_arguments)]
    async fn record_usage(
        &self,
        input: &QueryInput,
        answer: &str,
        usage: LlmUsage,
        retrieved_count: usize,
        reranked: bool,
        success: bool,
        error: Option<&Error>,
    ) {
        let log = UsageLog {
            provider: self.provider.clone(),
            model: self.model.clone(),
            user_id: input.tenant.owner_id.clone(),
            request_kind: RequestKind::Query,
            question: input.question.clone(),
            answer_preview: answer.chars().take(200).collect(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cost_estimate: None,
            duration_ms: 0,
            retrieved_count: retrieved_count as u32,
            reranked,
            success,
            error: error.map(|e| e.to_string().chars().take(500).collect()),
            client_ip: None,
            user_agent: None,
            timestamp: Utc::now(),
        };
        let _ = self.usage_repository.record(&log).await;
    }
}
