//! Cache services built on the domain ports.

pub mod cache_registry;
pub mod record_cache;
pub mod reference_resolver;
pub mod snapshot;

pub use cache_registry::CacheRegistry;
pub use record_cache::RecordCache;
pub use reference_resolver::{ReferenceResolver, References};
pub use snapshot::Snapshot;
