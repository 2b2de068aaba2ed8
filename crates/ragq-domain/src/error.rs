//! Error handling types.
//!
//! A single [`Error`] enum carries every failure mode that can cross a port
//! boundary in this service. Each variant maps to exactly one HTTP status in
//! `ragq-server`'s error handler (see `ragq-server::error_response`).

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the RAG question-answering service.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form).
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error with context.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found. Maps to HTTP 404.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Invalid argument supplied by a caller. Maps to HTTP 400.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Authentication failed or credentials are missing. Maps to HTTP 401.
    #[error("authentication error: {message}")]
    Authentication {
        /// Description of the authentication failure.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller is authenticated but not authorized for the resource. Maps to
    /// HTTP 403.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of why the action is forbidden.
        message: String,
    },

    /// Caller has exceeded a rate or lockout limit. Maps to HTTP 429.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Human-readable description, e.g. retry-after guidance.
        message: String,
        /// Seconds the caller should wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Vector store operation error.
    #[error("vector store error: {message}")]
    VectorDb {
        /// Description of the vector store error.
        message: String,
    },

    /// Embedding provider operation error.
    #[error("embedding provider error: {message}")]
    Embedding {
        /// Description of the embedding provider error.
        message: String,
    },

    /// Configuration-related error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error talking to an upstream HTTP service.
    #[error("network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database-related error.
    #[error("database error: {message}")]
    Database {
        /// Description of the database error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An upstream dependency (LLM, reranker, embedding provider, vector
    /// store) returned an error or is unreachable. Maps to HTTP 502.
    #[error("upstream error: {message}")]
    Upstream {
        /// Description of the upstream failure.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service is temporarily unable to serve the request (pool
    /// exhausted, dependency not ready). Maps to HTTP 503.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Description of why the service is unavailable.
        message: String,
    },

    /// Cache operation error.
    #[error("cache error: {message}")]
    Cache {
        /// Description of the cache error.
        message: String,
    },

    /// Internal system error that does not fit another variant. Maps to
    /// HTTP 500.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Create a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Create an authentication error with a source.
    pub fn authentication_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Authentication {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a rate-limited error without a known retry hint.
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Create a rate-limited error carrying a retry-after hint.
    pub fn rate_limited_after<S: Into<String>>(message: S, retry_after_secs: u64) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Create a vector store error.
    pub fn vector_db<S: Into<String>>(message: S) -> Self {
        Self::VectorDb {
            message: message.into(),
        }
    }

    /// Create an embedding provider error.
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create an I/O error with context and a source.
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a source.
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error.
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with a source.
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a database error.
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Create a database error with a source.
    pub fn database_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an upstream-dependency error.
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// Create an upstream-dependency error with a source.
    pub fn upstream_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Upstream {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a service-unavailable error.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a cache error.
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The HTTP status code this error maps to, per the §7 taxonomy.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument { .. } | Self::Json { .. } => 400,
            Self::Authentication { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::RateLimited { .. } => 429,
            Self::Upstream { .. } => 502,
            Self::Unavailable { .. } => 503,
            Self::IoSimple { .. }
            | Self::Io { .. }
            | Self::VectorDb { .. }
            | Self::Embedding { .. }
            | Self::Configuration { .. }
            | Self::Network { .. }
            | Self::Database { .. }
            | Self::Cache { .. }
            | Self::Internal { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(Error::not_found("knowledge entry").status_code(), 404);
        assert_eq!(Error::invalid_argument("bad query").status_code(), 400);
        assert_eq!(Error::authentication("bad token").status_code(), 401);
        assert_eq!(Error::forbidden("not an admin").status_code(), 403);
        assert_eq!(Error::rate_limited("too many attempts").status_code(), 429);
        assert_eq!(Error::upstream("llm timed out").status_code(), 502);
        assert_eq!(Error::unavailable("pool exhausted").status_code(), 503);
        assert_eq!(Error::internal("unreachable branch").status_code(), 500);
    }

    #[test]
    fn rate_limited_after_carries_retry_hint() {
        let err = Error::rate_limited_after("locked out", 300);
        match err {
            Error::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, Some(300)),
            _ => panic!("expected RateLimited"),
        }
    }
}
