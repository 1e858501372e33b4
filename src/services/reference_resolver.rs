//! Resolution of foreign keys held by other entities into cached records.
//!
//! An unset foreign key is reported as [`CacheError::DanglingReference`]; a
//! key that is set but names no cached record is [`CacheError::NotFound`],
//! exactly as [`RecordCache::find_by_id`] reports it. Callers that treat a
//! missing reference as normal use [`ReferenceResolver::resolve_optional`].

use std::sync::Arc;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{LookupReference, LookupValue, Record};
use crate::services::record_cache::RecordCache;

/// An entity holding a foreign key into the collection of `R`.
pub trait References<R: Record> {
    /// Name of the holder type, for error messages.
    const HOLDER: &'static str;

    /// Name of the foreign-key field on the holder.
    const FOREIGN_KEY: &'static str;

    /// The referenced identifier, `None` when unset.
    fn foreign_key(&self) -> Option<R::Id>;
}

impl References<LookupValue> for LookupReference {
    const HOLDER: &'static str = "LookupReference";
    const FOREIGN_KEY: &'static str = "lookup_value_id";

    fn foreign_key(&self) -> Option<i64> {
        self.lookup_value_id
    }
}

/// Resolves holder foreign keys through a [`RecordCache`], never touching
/// the backing store.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<R: Record> {
    cache: Arc<RecordCache<R>>,
}

impl<R: Record> ReferenceResolver<R> {
    /// Resolver reading from `cache`.
    pub const fn new(cache: Arc<RecordCache<R>>) -> Self {
        Self { cache }
    }

    /// The cache references are resolved against.
    pub fn cache(&self) -> &Arc<RecordCache<R>> {
        &self.cache
    }

    /// The record the holder points at.
    pub fn resolve<H: References<R>>(&self, holder: &H) -> CacheResult<Arc<R>> {
        let snapshot = self.cache.snapshot()?;
        let id = holder.foreign_key().ok_or_else(|| dangling::<R, H>())?;
        snapshot
            .get(&id)
            .cloned()
            .ok_or_else(|| CacheError::unresolved(R::COLLECTION, &[id]))
    }

    /// Like [`resolve`](Self::resolve), but an unset foreign key yields
    /// `Ok(None)`.
    pub fn resolve_optional<H: References<R>>(&self, holder: &H) -> CacheResult<Option<Arc<R>>> {
        match self.resolve(holder) {
            Ok(record) => Ok(Some(record)),
            Err(CacheError::DanglingReference { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Resolve several holders against one snapshot, in holder order.
    pub fn resolve_many<H: References<R>>(&self, holders: &[H]) -> CacheResult<Vec<Arc<R>>> {
        let snapshot = self.cache.snapshot()?;
        let mut resolved = Vec::with_capacity(holders.len());
        let mut missing = Vec::new();

        for holder in holders {
            let id = holder.foreign_key().ok_or_else(|| dangling::<R, H>())?;
            match snapshot.get(&id) {
                Some(record) => resolved.push(Arc::clone(record)),
                None => missing.push(id),
            }
        }

        if missing.is_empty() {
            Ok(resolved)
        } else {
            Err(CacheError::unresolved(R::COLLECTION, &missing))
        }
    }
}

fn dangling<R: Record, H: References<R>>() -> CacheError {
    CacheError::DanglingReference {
        holder: H::HOLDER.to_string(),
        field: H::FOREIGN_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InMemoryRecordLoader;

    async fn resolver() -> ReferenceResolver<LookupValue> {
        let loader = Arc::new(InMemoryRecordLoader::new(vec![
            LookupValue::new(1, "One"),
            LookupValue::new(2, "Two"),
        ]));
        let cache = RecordCache::<LookupValue>::load(loader).await.unwrap();
        ReferenceResolver::new(Arc::new(cache))
    }

    fn holder(lookup_value_id: Option<i64>) -> LookupReference {
        LookupReference {
            id: 10,
            lookup_value_id,
            label: "holder".into(),
        }
    }

    #[tokio::test]
    async fn test_resolve_matches_find_by_id() {
        let resolver = resolver().await;
        let resolved = resolver.resolve(&holder(Some(1))).unwrap();
        assert_eq!(resolved, resolver.cache().find_by_id(&1).unwrap());
    }

    #[tokio::test]
    async fn test_broken_reference_is_not_found() {
        let resolver = resolver().await;
        let err = resolver.resolve(&holder(Some(42))).unwrap_err();
        assert_eq!(err.missing_ids(), Some(&["42".to_string()][..]));
    }

    #[tokio::test]
    async fn test_unset_reference_is_dangling() {
        let resolver = resolver().await;
        let err = resolver.resolve(&holder(None)).unwrap_err();
        match err {
            CacheError::DanglingReference { holder, field } => {
                assert_eq!(holder, "LookupReference");
                assert_eq!(field, "lookup_value_id");
            }
            other => panic!("Expected DanglingReference, got {other:?}"),
        }
        assert!(resolver.resolve_optional(&holder(None)).unwrap().is_none());
        assert!(resolver.resolve_optional(&holder(Some(42))).is_err());
    }

    #[tokio::test]
    async fn test_resolve_many_reports_all_broken_keys() {
        let resolver = resolver().await;

        let ok = resolver
            .resolve_many(&[holder(Some(2)), holder(Some(1))])
            .unwrap();
        assert_eq!(ok.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);

        let err = resolver
            .resolve_many(&[holder(Some(7)), holder(Some(1)), holder(Some(8))])
            .unwrap_err();
        assert_eq!(err.missing_ids(), Some(&["7".to_string(), "8".to_string()][..]));
    }

    #[tokio::test]
    async fn test_uninitialized_cache_is_not_setup() {
        let loader = Arc::new(InMemoryRecordLoader::<LookupValue>::default());
        let resolver = ReferenceResolver::new(Arc::new(RecordCache::<LookupValue>::new(loader)));
        assert!(matches!(
            resolver.resolve(&holder(Some(1))),
            Err(CacheError::NotSetup { .. })
        ));
    }
}
