//! Domain layer constants.
//!
//! Default values named throughout `spec.md`. Every default here is
//! overridable through configuration (`ragq-infrastructure::config`); these
//! are the values used when no override is present.

// ============================================================================
// KEYWORD INDEX / BM25 (C3)
// ============================================================================

/// Okapi BM25 term-frequency saturation parameter.
pub const BM25_K1: f32 = 1.2;

/// Okapi BM25 length-normalization parameter.
pub const BM25_B: f32 = 0.75;

// ============================================================================
// RETRIEVER FUSION (C6)
// ============================================================================

/// Weight given to the vector (dense) score in hybrid fusion.
pub const FUSION_VECTOR_WEIGHT: f32 = 0.7;

/// Weight given to the keyword (BM25) score in hybrid fusion.
pub const FUSION_KEYWORD_WEIGHT: f32 = 0.3;

/// Candidate-gathering multiplier applied to `k` before fusion when
/// reranking is enabled: `C = k * RETRIEVER_RERANK_MULTIPLIER`. `1` when
/// reranking is off, since there is nothing to narrow back down from.
pub const RETRIEVER_RERANK_MULTIPLIER: usize = 3;

// ============================================================================
// RERANKER (4.8)
// ============================================================================

/// Number of candidates scored per reranker inference batch.
pub const RERANKER_BATCH_SIZE: usize = 32;

/// Maximum token length the reranker truncates each input to.
pub const RERANKER_MAX_LENGTH: usize = 512;

// ============================================================================
// SEMANTIC ANSWER CACHE (4.9)
// ============================================================================

/// Minimum cosine similarity for a semantic-cache fingerprint to count as a
/// hit.
pub const SEMANTIC_CACHE_SIMILARITY_THRESHOLD: f32 = 0.92;

// ============================================================================
// QA CHAIN CONTEXT BUDGET (C7)
// ============================================================================

/// Maximum characters contributed by a single retrieved source; longer
/// content is truncated head+tail with an ellipsis marker.
pub const MAX_SINGLE_CONTENT_CHARS: usize = 2000;

/// Maximum total characters in the assembled context string.
pub const MAX_CONTEXT_CHARS: usize = 8000;

/// Conversation turn count above which the summarizer runs before the next
/// call.
pub const MAX_HISTORY_TURNS: usize = 6;

/// Number of most-recent turns kept verbatim when summarizing.
pub const KEEP_RECENT_TURNS: usize = 3;

/// Maximum character length of a conversation summary.
pub const MAX_SUMMARY_CHARS: usize = 600;

// ============================================================================
// LLM CLIENT (§6)
// ============================================================================

/// Hard per-call timeout for LLM requests, including each streamed response.
pub const LLM_CALL_TIMEOUT_SECS: u64 = 120;

/// Default maximum retry attempts for transient/WAF-like LLM failures.
pub const LLM_MAX_RETRIES: u32 = 3;

// ============================================================================
// TASK QUEUE (C8)
// ============================================================================

/// Default fixed worker-pool size for the ingestion task queue.
pub const TASK_QUEUE_MAX_WORKERS: usize = 3;

// ============================================================================
// LOGIN RATE LIMITER (4.11)
// ============================================================================

/// Failed attempts, from the same IP or same username, before lockout.
pub const LOGIN_MAX_FAILED_ATTEMPTS: u32 = 5;

/// Lockout duration once `LOGIN_MAX_FAILED_ATTEMPTS` is reached.
pub const LOGIN_LOCKOUT_SECONDS: i64 = 300;

/// Periodic cleanup interval for expired rate-limiter entries.
pub const LOGIN_CLEANUP_INTERVAL_SECONDS: i64 = 3600;

// ============================================================================
// INGESTION / CHUNKING (C4, C5)
// ============================================================================

/// Default batch size for embedding + upsert operations during ingestion.
pub const INDEXING_BATCH_SIZE: usize = 10;

/// Minimum character length for a chunk to be indexed.
pub const INDEXING_CHUNK_MIN_LENGTH: usize = 25;

/// Minimum number of lines for a chunk to be indexed.
pub const INDEXING_CHUNK_MIN_LINES: usize = 2;

/// Maximum number of chunks extracted from a single file.
pub const INDEXING_CHUNKS_MAX_PER_FILE: usize = 50;

/// Target chunk size, in characters, for both the document and code
/// chunkers' recursive splitter.
pub const CHUNK_TARGET_SIZE: usize = 1500;

/// Overlap, in characters, between consecutive chunks produced by the
/// recursive splitter.
pub const CHUNK_OVERLAP_SIZE: usize = 150;

/// Maximum length of a breadcrumb/context prefix prepended to a chunk's
/// `enhanced_content`.
pub const CHUNK_CONTEXT_PREFIX_MAX_LEN: usize = 200;
