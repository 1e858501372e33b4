//! Domain models: records, lookup rows and configuration.

pub mod config;
pub mod lookup;
pub mod record;

pub use config::{CollectionConfig, Config, DatabaseConfig, LoggingConfig};
pub use lookup::{LookupReference, LookupValue};
pub use record::{FieldValue, Record, RecordKey};
