//! Adapter implementations for the ports defined in `ragq-domain`.
//!
//! Every type here implements exactly one `ragq_domain::ports::providers`
//! trait; nothing above this crate should need to know which concrete
//! backend (Qdrant, fastembed, an OpenAI-compatible HTTP API, ...) answers a
//! port, only the port itself. `ragq-infrastructure` is the only caller that
//! constructs these types directly.
//!
//! | Port | Component | Module |
//! |------|-----------|--------|
//! | `EmbeddingClient` | C1 | [`embedding`] |
//! | `VectorStoreClient` | C2 | [`vector_store`] |
//! | `KeywordIndex` | C3 | [`keyword_index`] |
//! | `DocumentChunker` / `CodeChunker` | C4 | [`chunking`] |
//! | `Reranker` | 4.8 | [`reranker`] |
//! | `LlmClient` | §6 | [`llm`] |

/// Shared HTTP helpers for the network-backed adapters.
pub mod utils;
/// Provider-specific constants.
pub mod constants;

/// Dense embedding clients: a local ONNX model and a remote HTTP API.
pub mod embedding;
/// Qdrant-backed vector store client.
pub mod vector_store;
/// In-process BM25 keyword index.
pub mod keyword_index;
/// Heading-aware document chunker and regex-boundary code chunker.
pub mod chunking;
/// Cross-encoder reranker client with an LRU+TTL score cache.
pub mod reranker;
/// Normalized LLM client over an OpenAI-compatible chat-completions API.
pub mod llm;

pub use embedding::{LocalEmbeddingClient, RemoteEmbeddingClient};
pub use vector_store::QdrantClient;
pub use keyword_index::Bm25Index;
pub use chunking::{HeadingAwareDocumentChunker, RegexCodeChunker};
pub use reranker::CachingCrossEncoderReranker;
pub use llm::OpenAiCompatibleClient;
