//! Configuration loader: defaults, overridden by an optional TOML file,
//! overridden by environment variables (figment's merge order, environment
//! wins last — matching §6 "Environment inputs").

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use ragq_domain::error::{Error, Result};

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_FILENAME, JWT_MIN_SECRET_LENGTH};

use super::types::AppConfig;

/// Loads [`AppConfig`] from defaults, an optional TOML file, and
/// `RAGQ_`-prefixed environment variables.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Build a loader with no explicit config file (falls back to
    /// `./ragq.toml` if present).
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Point the loader at an explicit config file path.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load and validate the merged configuration.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let config_path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));

        if config_path.exists() {
            figment = figment.merge(Toml::file(&config_path));
            tracing::info!(path = %config_path.display(), "loaded configuration file");
        } else if self.config_path.is_some() {
            tracing::warn!(path = %config_path.display(), "configuration file not found");
        }

        figment = figment.merge(Env::prefixed(&format!("{CONFIG_ENV_PREFIX}_")).split("_"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::configuration_with_source("failed to extract configuration", e))?;

        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(Error::configuration("server port cannot be 0"));
    }

    if config.auth.jwt_secret.len() < JWT_MIN_SECRET_LENGTH {
        return Err(Error::configuration(format!(
            "jwt secret must be at least {JWT_MIN_SECRET_LENGTH} characters"
        )));
    }

    if config.database.url.is_empty() {
        return Err(Error::configuration("database url cannot be empty"));
    }

    if config.database.max_connections < config.database.min_connections {
        return Err(Error::configuration(
            "database max_connections must be >= min_connections",
        ));
    }

    if !matches!(config.providers.embedding.kind.as_str(), "local" | "remote") {
        return Err(Error::configuration(format!(
            "unknown embedding provider kind: {}",
            config.providers.embedding.kind
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn accepts_sufficiently_long_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "a".repeat(JWT_MIN_SECRET_LENGTH);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_embedding_kind() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "a".repeat(JWT_MIN_SECRET_LENGTH);
        config.providers.embedding.kind = "bogus".to_string();
        assert!(validate(&config).is_err());
    }
}
