//! One module per domain repository port, each a thin sqlx wrapper over a
//! single Postgres table (or, for knowledge groups, a join table).

mod api_key;
mod knowledge;
mod state_store;
mod task;
mod usage;
mod version;

pub use api_key::PgApiKeyRepository;
pub use knowledge::PgKnowledgeRepository;
pub use state_store::PgStateStoreProvider;
pub use task::PgTaskRepository;
pub use usage::PgUsageRepository;
pub use version::PgVersionRepository;
