//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::database::utils::sql_identifier;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown `logging.level`.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown `logging.format`.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// `database.path` is empty.
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    /// `database.max_connections` is zero.
    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    /// A collection or identifier field name is not a plain SQL identifier.
    #[error("Invalid name for collection {collection}: {name:?}")]
    InvalidCollectionName {
        /// Collection key in the config.
        collection: String,
        /// Offending name.
        name: String,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tablecache/config.yaml (project config)
    /// 3. .tablecache/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`TABLECACHE_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".tablecache/config.yaml"))
            .merge(Yaml::file(".tablecache/local.yaml"))
            .merge(Env::prefixed("TABLECACHE_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        for (collection, settings) in &config.collections {
            for name in [collection.as_str(), settings.identifier_field.as_str()] {
                if sql_identifier(name).is_err() {
                    return Err(ConfigError::InvalidCollectionName {
                        collection: collection.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
