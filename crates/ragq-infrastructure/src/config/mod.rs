//! Configuration loading and value types.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, AuthConfig, DatabaseConfig, EmbeddingProviderConfig, IndexingConfig, LimitsConfig,
    LoggingConfig, ProviderEndpoint, ProvidersConfig, ServerConfig,
};
