//! Domain entities — objects with identity and a lifecycle, as opposed to
//! the value objects in [`crate::value_objects`].
//!
//! | Entity | Description |
//! |--------|-------------|
//! | [`Chunk`] | The atomic unit of retrieval |
//! | [`KnowledgeEntry`] / [`KnowledgeGroup`] | User-authored artifacts |
//! | [`VersionRecord`] | Append-only snapshot history |
//! | [`IndexingState`] | Durable incremental-indexing state |
//! | [`SemanticCacheEntry`] / [`RerankerCacheEntry`] | Cached QA/rerank results |
//! | [`UsageLog`] | Append-only LLM-invocation audit trail |
//! | [`User`] / [`ApiKey`] | Minimal identity |
//! | [`KnowledgeTask`] | An asynchronous ingestion task |

/// Semantic and reranker cache entries.
pub mod cache;
/// The chunk entity.
pub mod chunk;
/// Minimal user/API-key identity.
pub mod identity;
/// Durable incremental-indexing state.
pub mod indexing_state;
/// Knowledge entries and groups.
pub mod knowledge;
/// The asynchronous ingestion task.
pub mod task;
/// Append-only usage audit log.
pub mod usage;
/// Append-only version history.
pub mod version;

pub use cache::{RerankedCandidate, RerankerCacheEntry, SemanticCacheEntry};
pub use chunk::{Chunk, ChunkKind};
pub use identity::{ApiKey, User};
pub use indexing_state::{FileIndexRecord, IndexingState};
pub use knowledge::{KnowledgeEntry, KnowledgeGroup};
pub use task::{KnowledgeTask, TaskStatus};
pub use usage::{RequestKind, UsageLog};
pub use version::{ChangeKind, VersionRecord};
