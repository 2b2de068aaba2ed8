//! External Provider Ports
//!
//! Contracts for the external services the domain depends on but does not
//! implement: embeddings, vector storage, keyword search, chunking,
//! reranking, and LLM completion.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`EmbeddingClient`] | Text → dense vector (C1) |
//! | [`VectorStoreClient`] | Vector upsert/search/filter (C2) |
//! | [`KeywordIndex`] | BM25-style full-text search (C3) |
//! | [`DocumentChunker`] / [`CodeChunker`] | Context-aware segmentation (C4) |
//! | [`Reranker`] | Cross-encoder candidate scoring (4.8) |
//! | [`LlmClient`] | Normalized chat-completion client |

/// Chunker ports.
pub mod chunker;
/// Embedding client port.
pub mod embedding;
/// Keyword index port.
pub mod keyword_index;
/// LLM client port.
pub mod llm;
/// Reranker port.
pub mod reranker;
/// Vector store client port.
pub mod vector_store;

pub use chunker::{CodeChunker, DocumentChunker};
pub use embedding::EmbeddingClient;
pub use keyword_index::{KeywordIndex, KeywordSearchHit};
pub use llm::{LlmCallOptions, LlmClient, LlmMessage, LlmResponse, LlmUsage};
pub use reranker::{RerankCandidate, RerankResult, Reranker};
pub use vector_store::{
    DistanceMetric, ScrollPage, VectorFilter, VectorPoint, VectorSearchHit, VectorStoreClient,
};
