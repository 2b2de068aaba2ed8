//! Configuration value types, merged from defaults, a TOML file, and
//! environment variables (environment wins) by [`super::loader::ConfigLoader`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    API_KEY_CACHE_TTL_SECS, DB_POOL_ACQUIRE_TIMEOUT_SECS, DB_POOL_MAX_CONNECTIONS,
    DB_POOL_MAX_LIFETIME_SECS, DB_POOL_MIN_CONNECTIONS, SCHEDULER_POLL_INTERVAL_SECS,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server bind settings.
    pub server: ServerConfig,
    /// JWT verification settings.
    pub auth: AuthConfig,
    /// Postgres connection and pool settings.
    pub database: DatabaseConfig,
    /// Upstream provider settings (embedding, vector store, keyword index,
    /// LLM, reranker).
    pub providers: ProvidersConfig,
    /// Conversation/cache/rate-limit/scheduler thresholds.
    pub limits: LimitsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Corpus indexing settings.
    pub indexing: IndexingConfig,
}

/// Server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. `0.0.0.0`.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// JWT verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. **Required** when the server is started; must
    /// be at least `JWT_MIN_SECRET_LENGTH` characters.
    #[serde(default)]
    pub jwt_secret: String,
    /// Whether a legacy unbound API key falls back to the first
    /// administrator user.
    #[serde(default)]
    pub allow_legacy_admin_fallback: bool,
    /// Header name API keys are presented in.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

fn default_api_key_header() -> String {
    "X-API-Key".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            allow_legacy_admin_fallback: false,
            api_key_header: default_api_key_header(),
        }
    }
}

/// Postgres connection and pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    pub url: String,
    /// Minimum warm connections.
    pub min_connections: u32,
    /// Maximum connections, including overflow.
    pub max_connections: u32,
    /// Seconds to wait for a connection before failing.
    pub acquire_timeout_secs: u64,
    /// Maximum connection lifetime before recycling, in seconds.
    pub max_lifetime_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/ragq".to_string(),
            min_connections: DB_POOL_MIN_CONNECTIONS,
            max_connections: DB_POOL_MAX_CONNECTIONS,
            acquire_timeout_secs: DB_POOL_ACQUIRE_TIMEOUT_SECS,
            max_lifetime_secs: DB_POOL_MAX_LIFETIME_SECS,
        }
    }
}

/// One upstream HTTP provider's connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderEndpoint {
    /// Base URL of the provider's API.
    pub base_url: String,
    /// API key, if the provider requires one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier, for providers that are model-addressed.
    #[serde(default)]
    pub model: Option<String>,
}

/// Settings for every upstream provider the service talks to.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// Dense embedding provider. Local (`fastembed`) mode ignores
    /// `base_url`/`api_key`.
    pub embedding: EmbeddingProviderConfig,
    /// Qdrant vector store connection.
    pub vector_store: ProviderEndpoint,
    /// LLM completion provider.
    pub llm: ProviderEndpoint,
    /// Cross-encoder reranker provider.
    pub reranker: ProviderEndpoint,
}

/// Embedding provider selection and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingProviderConfig {
    /// `"local"` (in-process `fastembed`) or `"remote"` (HTTP API).
    pub kind: String,
    /// Remote provider connection settings, ignored when `kind == "local"`.
    #[serde(flatten)]
    pub endpoint: ProviderEndpoint,
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            kind: "local".to_string(),
            endpoint: ProviderEndpoint::default(),
        }
    }
}

/// Conversation/cache/rate-limit/scheduler thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// API-key verification cache TTL, in seconds.
    pub api_key_cache_ttl_secs: u64,
    /// Background ingestion scheduler polling interval, in seconds.
    pub scheduler_poll_interval_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            api_key_cache_ttl_secs: API_KEY_CACHE_TTL_SECS,
            scheduler_poll_interval_secs: SCHEDULER_POLL_INTERVAL_SECS,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit structured JSON instead of human-readable text.
    pub json_format: bool,
    /// Optional path to a daily-rotated log file, in addition to stdout.
    pub file_output: Option<std::path::PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Corpus indexing settings: where the scheduler walks, whose identity
/// ingested entries are attributed to, and the vector-store collection
/// names used by each pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Directory tree walked by the ingestion coordinator and scheduler.
    pub root_path: std::path::PathBuf,
    /// Owner id attributed to corpus-walk ingested chunks.
    pub owner_id: String,
    /// Whether corpus-walk ingested chunks are world-readable.
    pub is_public: bool,
    /// Vector-store collection for corpus chunks (C2/C5/C6).
    pub corpus_collection: String,
    /// Vector-store collection for manually added knowledge entries (C8).
    pub knowledge_collection: String,
    /// Vector-store collection for the QA semantic cache (§4.9).
    pub cache_collection: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            root_path: std::path::PathBuf::from("."),
            owner_id: "system".to_string(),
            is_public: true,
            corpus_collection: "ragq_corpus".to_string(),
            knowledge_collection: "ragq_knowledge".to_string(),
            cache_collection: "ragq_qa_cache".to_string(),
        }
    }
}
