//! `SQLite` adapters: connection pool, snapshot loader and write repositories.

pub mod connection;
pub mod lookup_repo;
pub mod sqlite_loader;
pub mod utils;

pub use connection::DatabaseConnection;
pub use lookup_repo::{LookupReferenceRepositoryImpl, LookupValueRepositoryImpl};
pub use sqlite_loader::SqliteRecordLoader;
