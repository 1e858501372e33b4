//! `SQLite` connection pool and migrations.

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::models::DatabaseConfig;

/// Database connection pool manager
///
/// Manages `SQLite` connection pool with WAL mode enabled for better concurrency.
/// Handles connection lifecycle, migrations, and configuration.
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Create a new database connection pool with WAL mode enabled
    ///
    /// # Arguments
    /// * `database_url` - `SQLite` database URL (e.g., "sqlite:.tablecache/tablecache.db")
    /// * `max_connections` - Upper bound of the pool
    ///
    /// # Configuration
    /// - Journal mode: WAL (Write-Ahead Logging)
    /// - Synchronous: NORMAL (good balance of safety and performance)
    /// - Foreign keys: Enabled
    /// - Busy timeout: 5 seconds
    /// - Idle timeout: 30 seconds
    /// - Max lifetime: 30 minutes
    /// - Acquire timeout: 10 seconds
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("invalid database URL")?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections.max(1))
            .idle_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("failed to create connection pool")?;

        Ok(Self { pool })
    }

    /// Open the database described by a [`DatabaseConfig`].
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.url(), config.max_connections).await
    }

    /// Private in-memory database on a single long-lived connection.
    ///
    /// Every `SQLite` in-memory connection is its own database, so the pool
    /// must never open a second one or recycle the first.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid database URL")?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to create in-memory database")?;

        Ok(Self { pool })
    }

    /// Run database migrations at startup
    ///
    /// Applies all pending migrations from the migrations/ directory.
    /// Safe to call multiple times - only applies new migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    ///
    /// Use this to pass the pool to repository implementations.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool gracefully
    ///
    /// Closes all connections and waits for them to finish.
    /// Should be called during application shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = DatabaseConnection::in_memory()
            .await
            .expect("failed to create database connection");

        assert!(!db.pool().is_closed());

        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_migration_creates_tables() {
        let db = DatabaseConnection::in_memory()
            .await
            .expect("failed to create database connection");

        db.migrate().await.expect("failed to run migrations");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'lookup_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .expect("failed to query tables");

        let names: Vec<String> = tables.into_iter().map(|t| t.0).collect();
        assert_eq!(names, vec!["lookup_references", "lookup_values"]);

        db.close().await;
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = DatabaseConnection::in_memory()
            .await
            .expect("failed to create database connection");

        db.migrate().await.expect("first migration run failed");
        db.migrate().await.expect("second migration run failed");

        db.close().await;
    }

    #[tokio::test]
    async fn test_file_database_from_config() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = DatabaseConfig {
            path: dir.path().join("cache.db").display().to_string(),
            max_connections: 2,
        };

        let db = DatabaseConnection::from_config(&config)
            .await
            .expect("failed to open file database");
        db.migrate().await.expect("failed to run migrations");

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .expect("failed to read journal mode");
        assert_eq!(mode.to_lowercase(), "wal");

        db.close().await;
    }
}
