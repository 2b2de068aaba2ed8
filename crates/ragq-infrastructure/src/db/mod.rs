//! Postgres-backed repository adapters.

mod pool;
mod repositories;

pub use pool::build_pool;
pub use repositories::{
    PgApiKeyRepository, PgKnowledgeRepository, PgStateStoreProvider, PgTaskRepository,
    PgUsageRepository, PgVersionRepository,
};
