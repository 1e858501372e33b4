#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Create an in-memory SQLite database for testing
///
/// Creates a fresh in-memory database with migrations applied.
/// Each call creates a completely isolated database instance. The pool holds
/// exactly one connection that is never recycled, since a second in-memory
/// connection would see a different, empty database.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid in-memory URL")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("failed to create test database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Insert lookup values in order, so the first gets id 1
pub async fn seed_lookup_values(pool: &SqlitePool, values: &[&str]) {
    for value in values {
        sqlx::query("INSERT INTO lookup_values (value) VALUES (?)")
            .bind(value)
            .execute(pool)
            .await
            .expect("failed to seed lookup value");
    }
}

/// Teardown test database
///
/// Closes the connection pool and cleans up resources.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
