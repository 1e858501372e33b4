//! tablecache - whole-collection record cache
//!
//! tablecache keeps small, read-mostly collections (lookup tables, enums
//! stored as rows) entirely in memory. A collection is read from its backing
//! store in one pass, held as an immutable snapshot, and served to readers
//! without touching the store again until it is explicitly reloaded.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): records, errors, configuration models and ports
//! - **Service Layer** (`services`): snapshots, the record cache, reference
//!   resolution and the cache registry
//! - **Infrastructure Layer** (`infrastructure`): `SQLite` adapters,
//!   configuration loading, logging and startup wiring
//!
//! # Example
//!
//! ```no_run
//! use tablecache::infrastructure::config::ConfigLoader;
//! use tablecache::infrastructure::setup::bootstrap;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let runtime = bootstrap(&config).await?;
//!
//!     let values = runtime.lookup_values()?;
//!     let two = values.find_by_id(&2)?;
//!     println!("{}", two.value);
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CollectionConfig, Config, DatabaseConfig, FieldValue, LoggingConfig, LookupReference,
    LookupValue, Record, RecordKey,
};
pub use domain::ports::{InMemoryRecordLoader, RecordLoader};
pub use domain::{CacheError, CacheResult, NotFoundReason};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CacheRegistry, RecordCache, ReferenceResolver, References, Snapshot};
