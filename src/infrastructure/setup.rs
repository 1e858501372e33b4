//! tablecache setup and initialization infrastructure
//!
//! Handles project initialization and startup wiring:
//! - Configuration directory and default config file creation
//! - Database migrations
//! - Opening the store and warming the registered caches

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::models::{Config, LookupValue, Record};
use crate::infrastructure::database::{DatabaseConnection, SqliteRecordLoader};
use crate::services::{CacheRegistry, RecordCache};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tablecache configuration
# Override settings by editing this file, adding .tablecache/local.yaml,
# or setting environment variables with the TABLECACHE_ prefix
#
# Example environment variables:
#   export TABLECACHE_DATABASE__PATH=/custom/path/tablecache.db
#   export TABLECACHE_LOGGING__LEVEL=debug
#   export TABLECACHE_COLLECTIONS__LOOKUP_VALUES__IDENTIFIER_FIELD=id

# Database configuration
database:
  # Path to SQLite database file (project-local)
  path: ".tablecache/tablecache.db"

  # Maximum number of database connections in pool
  max_connections: 10

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "json"

# Cached collections
collections:
  lookup_values:
    # Attribute records are keyed and ordered by
    identifier_field: "id"
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    /// `.tablecache` directory
    pub config_dir: PathBuf,
    /// `.tablecache/config.yaml`
    pub config_file: PathBuf,
    /// `.tablecache/tablecache.db`
    pub database_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let config_dir = root.as_ref().join(".tablecache");

        Self {
            config_file: config_dir.join("config.yaml"),
            database_file: config_dir.join("tablecache.db"),
            config_dir,
        }
    }

    /// Check if tablecache is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths, force: bool) -> Result<()> {
    if paths.config_dir.exists() && !force {
        return Ok(());
    }

    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;

    Ok(())
}

/// Create the default configuration file
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<()> {
    if paths.config_file.exists() && !force {
        return Ok(());
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .context("Failed to write config file")?;

    Ok(())
}

/// Create the database file if needed and apply pending migrations
pub async fn run_migrations(paths: &SetupPaths) -> Result<()> {
    ensure_parent_dir(&paths.database_file)?;

    let db_url = format!("sqlite:{}", paths.database_file.display());
    let db = DatabaseConnection::new(&db_url, 1).await?;
    db.migrate().await?;
    db.close().await;

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    Ok(())
}

/// Open store and warmed caches, ready for lookups
pub struct CacheRuntime {
    /// Open connection pool
    pub db: DatabaseConnection,
    /// Loaded caches by collection
    pub registry: CacheRegistry,
}

impl CacheRuntime {
    /// Typed handle to the `lookup_values` cache
    pub fn lookup_values(&self) -> Result<Arc<RecordCache<LookupValue>>> {
        Ok(self.registry.require::<LookupValue>()?)
    }

    /// Close the database pool; cached snapshots stay readable.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}

/// Open the configured database, migrate it and load every cached collection
///
/// The database path must name a file; a plain in-memory URL would give each
/// pooled connection its own empty database.
pub async fn bootstrap(config: &Config) -> Result<CacheRuntime> {
    if !config.database.path.starts_with("sqlite:") {
        ensure_parent_dir(Path::new(&config.database.path))?;
    }

    let db = DatabaseConnection::from_config(&config.database).await?;
    db.migrate().await?;

    let loader = SqliteRecordLoader::<LookupValue>::new(
        db.pool().clone(),
        &config.collection(LookupValue::COLLECTION),
    )?;
    let cache = RecordCache::<LookupValue>::load(Arc::new(loader))
        .await
        .context("Failed to load lookup_values cache")?;

    let mut registry = CacheRegistry::new();
    registry.register(Arc::new(cache));

    tracing::info!(
        collections = ?registry.collections(),
        database = %config.database.path,
        "caches ready"
    );

    Ok(CacheRuntime { db, registry })
}
