//! Repository Interfaces
//!
//! Abstract relational persistence for the aggregates that are not
//! themselves vector-store points: knowledge entries/groups, version
//! history, usage logs, API keys/users, and knowledge tasks.
//!
//! | Repository | Description |
//! |------------|-------------|
//! | [`KnowledgeRepository`] | Knowledge entries and groups |
//! | [`VersionRepository`] | Append-only version history |
//! | [`UsageRepository`] | Append-only LLM-usage audit trail |
//! | [`ApiKeyRepository`] | API keys and users |
//! | [`TaskRepository`] | Asynchronous ingestion tasks |

/// API key / user repository.
pub mod api_key_repository;
/// Knowledge entry / group repository.
pub mod knowledge_repository;
/// Knowledge task repository.
pub mod task_repository;
/// Usage log repository.
pub mod usage_repository;
/// Version record repository.
pub mod version_repository;

pub use api_key_repository::ApiKeyRepository;
pub use knowledge_repository::KnowledgeRepository;
pub use task_repository::TaskRepository;
pub use usage_repository::UsageRepository;
pub use version_repository::VersionRepository;
