//! Configuration models deserialized by the config loader.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Main configuration structure for tablecache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-collection cache settings, keyed by collection name
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,
}

impl Config {
    /// Settings for a collection, falling back to defaults when unconfigured.
    pub fn collection(&self, name: &str) -> CollectionConfig {
        self.collections.get(name).cloned().unwrap_or_default()
    }
}

/// Settings for one cached collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollectionConfig {
    /// Field records are keyed and ordered by
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,
}

fn default_identifier_field() -> String {
    "id".to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            identifier_field: default_identifier_field(),
        }
    }
}

impl CollectionConfig {
    /// Settings keying the collection on `field`.
    pub fn with_identifier_field(field: impl Into<String>) -> Self {
        Self {
            identifier_field: field.into(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".tablecache/tablecache.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl DatabaseConfig {
    /// `sqlite:` URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
