//! Domain layer for tablecache
//!
//! Record abstraction, configuration models, errors and the port traits that
//! infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CacheError, CacheResult, NotFoundReason};
