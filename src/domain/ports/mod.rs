//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - RecordLoader: full-collection reads feeding the cache
//! - LookupValueRepository / LookupReferenceRepository: backing store writes
//!
//! `InMemoryRecordLoader` is a store-less loader for tests and for callers that
//! already hold the collection.

pub mod in_memory_loader;
pub mod lookup_repository;
pub mod record_loader;

pub use in_memory_loader::InMemoryRecordLoader;
pub use lookup_repository::{LookupReferenceRepository, LookupValueRepository};
pub use record_loader::RecordLoader;
