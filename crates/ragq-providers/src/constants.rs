//! Provider-specific constants, separate from the domain defaults in
//! `ragq_domain::constants`.

/// FastEmbed's `AllMiniLML6V2` model dimension, the local embedding
/// client's default model.
pub const EMBEDDING_DIMENSION_FASTEMBED_DEFAULT: usize = 384;

/// `text-embedding-3-small` dimension, the remote embedding client's
/// default model.
pub const EMBEDDING_DIMENSION_REMOTE_DEFAULT: usize = 1536;

/// Largest batch a single embedding call accepts.
pub const EMBEDDING_MAX_BATCH_SIZE: usize = 96;

/// JSON content type header value.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP request timeout for embedding and reranker API calls.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum token length kept by the BM25 tokenizer.
pub const BM25_TOKEN_MIN_LENGTH: usize = 2;

/// Reranker cache entry time-to-live, in seconds.
pub const RERANKER_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of distinct (query, candidate) scores the reranker cache
/// holds at once.
pub const RERANKER_CACHE_MAX_ENTRIES: u64 = 10_000;
