//! Domain Port Interfaces
//!
//! Defines every boundary contract between the domain and the outside
//! world, following the Dependency Inversion Principle: the domain
//! defines the interfaces; `ragq-providers` and `ragq-infrastructure`
//! implement them.
//!
//! ## Organization
//!
//! - **providers/** — external service adapters (embeddings, vector
//!   store, keyword index, chunking, reranking, LLM).
//! - **infrastructure/** — cross-cutting services (auth verification,
//!   locking, durable state).
//! - **repositories/** — relational persistence for entities that are not
//!   vector-store points.

/// Infrastructure service ports.
pub mod infrastructure;
/// External service provider ports.
pub mod providers;
/// Repository ports.
pub mod repositories;

pub use infrastructure::{LockGuard, LockProvider, PasswordHasher, StateStoreProvider, TokenClaims, TokenVerifier};
pub use providers::{
    CodeChunker, DistanceMetric, DocumentChunker, EmbeddingClient, KeywordIndex,
    KeywordSearchHit, LlmCallOptions, LlmClient, LlmMessage, LlmResponse, LlmUsage,
    RerankCandidate, RerankResult, Reranker, ScrollPage, VectorFilter, VectorPoint,
    VectorSearchHit, VectorStoreClient,
};
pub use repositories::{
    ApiKeyRepository, KnowledgeRepository, TaskRepository, UsageRepository, VersionRepository,
};
