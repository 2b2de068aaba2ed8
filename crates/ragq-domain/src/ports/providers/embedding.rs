//! Embedding Client Port (C1)

use crate::error::Result;
use crate::value_objects::Embedding;
use async_trait::async_trait;

/// Text → dense vector, local model or remote API.
///
/// Implementations must L2-normalize every returned vector and must
/// preserve input order in the returned `Vec` regardless of how an
/// upstream API orders its response (the remote variant may receive
/// results carrying an explicit index field and must re-sort by it).
///
/// `dimension()` is determined on first use and cached by the
/// implementation; it must be stable for the lifetime of the client.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Encode a batch of texts into unit-length embeddings, one per input,
    /// in input order. `texts.len()` must not exceed `max_batch_size()`.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// The embedding dimension this client produces. Resolved on first
    /// successful call to `encode` and cached thereafter.
    fn dimension(&self) -> Option<usize>;

    /// The largest batch this client accepts in one `encode` call.
    fn max_batch_size(&self) -> usize;
}
