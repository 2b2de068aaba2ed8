//! Server-specific tunables not already covered by
//! `ragq_infrastructure::constants` or `ragq_domain::constants`.

/// Default number of sources returned by `/query` and `/search` when the
/// caller omits `k`.
pub const DEFAULT_RETRIEVAL_K: usize = 5;

/// Upper bound on the caller-supplied `k`, to keep a single request from
/// forcing an unbounded fan-out into the vector store and reranker.
pub const MAX_RETRIEVAL_K: usize = 50;

/// A conversation session idle for longer than this is eligible for
/// cleanup by the periodic sweep.
pub const SESSION_IDLE_TIMEOUT_SECS: u64 = 3600;

/// How often the idle-session sweep runs.
pub const SESSION_CLEANUP_INTERVAL_SECS: u64 = 600;
