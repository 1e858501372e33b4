//! Immutable point-in-time copy of a cached collection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{Record, RecordKey};

/// Ordered records plus an identifier index.
///
/// Every record in `records` has exactly one entry in `index` (its position),
/// and every index entry points at a record with that identifier. A snapshot
/// is never mutated after [`Snapshot::build`] returns.
#[derive(Debug)]
pub struct Snapshot<R: Record> {
    records: Vec<Arc<R>>,
    index: HashMap<R::Id, usize>,
    identifier_field: String,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl<R: Record> Snapshot<R> {
    /// Build a snapshot keyed on `R::ID_FIELD`, keeping the loaded order.
    pub fn build(records: Vec<R>, generation: u64) -> CacheResult<Self> {
        Self::build_keyed(records, generation, R::ID_FIELD)
    }

    /// Build a snapshot keyed on `identifier_field`, keeping the loaded order.
    ///
    /// A record whose identifier field is missing, null or not convertible to
    /// `R::Id`, or two records sharing a key, mean the store handed back a
    /// collection that cannot be indexed; both are backing store errors.
    pub fn build_keyed(
        records: Vec<R>,
        generation: u64,
        identifier_field: &str,
    ) -> CacheResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        let mut stored = Vec::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            let id = Self::key_of(&record, identifier_field)?;
            if index.insert(id.clone(), position).is_some() {
                return Err(CacheError::backing_store(
                    R::COLLECTION,
                    format!("duplicate {identifier_field} {id} in loaded collection"),
                ));
            }
            stored.push(Arc::new(record));
        }

        Ok(Self {
            records: stored,
            index,
            identifier_field: identifier_field.to_string(),
            generation,
            loaded_at: Utc::now(),
        })
    }

    fn key_of(record: &R, identifier_field: &str) -> CacheResult<R::Id> {
        if identifier_field == R::ID_FIELD {
            return Ok(record.record_id());
        }
        let value = record.field(identifier_field);
        value
            .as_ref()
            .and_then(<R::Id as RecordKey>::from_field)
            .ok_or_else(|| {
                CacheError::backing_store(
                    R::COLLECTION,
                    format!(
                        "record {} has no usable {identifier_field} key (found {})",
                        record.record_id(),
                        value.map_or_else(|| "no such field".to_string(), |v| v.to_string()),
                    ),
                )
            })
    }

    /// Record keyed by `id`.
    pub fn get(&self, id: &R::Id) -> Option<&Arc<R>> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// True when a record is keyed by `id`.
    pub fn contains(&self, id: &R::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a record in list order.
    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All records in list order.
    pub fn records(&self) -> &[Arc<R>] {
        &self.records
    }

    /// Iterate records in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<R>> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the collection was empty at load time.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Field the index is keyed on.
    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Monotonic counter of successful reloads; the first snapshot is 1.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// When the records were read from the store.
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Records for `ids`, in list order. Duplicates in `ids` collapse.
    ///
    /// Fails with every unresolved identifier, in input order.
    pub fn find_many(&self, ids: &[R::Id]) -> CacheResult<Vec<Arc<R>>> {
        if ids.is_empty() {
            return Err(CacheError::unresolved::<R::Id>(R::COLLECTION, &[]));
        }

        let mut positions = Vec::with_capacity(ids.len());
        let mut missing: Vec<&R::Id> = Vec::new();
        for id in ids {
            match self.position(id) {
                Some(position) => positions.push(position),
                None if !missing.contains(&id) => missing.push(id),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(CacheError::unresolved(R::COLLECTION, &missing));
        }

        positions.sort_unstable();
        positions.dedup();
        Ok(positions
            .into_iter()
            .map(|position| Arc::clone(&self.records[position]))
            .collect())
    }

    /// First record, in list order, matching `predicate`.
    pub fn find_first<P>(&self, predicate: P) -> Option<&Arc<R>>
    where
        P: Fn(&R) -> bool,
    {
        self.records.iter().find(|record| predicate(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LookupValue;

    fn sample() -> Snapshot<LookupValue> {
        Snapshot::build(
            vec![
                LookupValue::new(1, "One"),
                LookupValue::new(2, "Two"),
                LookupValue::new(3, "Three"),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_index_matches_sequence() {
        let snapshot = sample();
        assert_eq!(snapshot.len(), 3);
        for (position, record) in snapshot.iter().enumerate() {
            assert_eq!(snapshot.position(&record.id), Some(position));
            assert_eq!(snapshot.get(&record.id), Some(record));
        }
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let err = Snapshot::build(
            vec![LookupValue::new(1, "One"), LookupValue::new(1, "Uno")],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CacheError::BackingStore { .. }));
    }

    #[test]
    fn test_keyed_on_other_field() {
        let snapshot = Snapshot::build_keyed(
            vec![LookupValue::new(1, "20"), LookupValue::new(2, "10")],
            1,
            "value",
        )
        .unwrap();

        assert_eq!(snapshot.identifier_field(), "value");
        assert_eq!(snapshot.get(&20).map(|r| r.id), Some(1));
        assert_eq!(snapshot.get(&10).map(|r| r.id), Some(2));
        assert!(!snapshot.contains(&1));
        assert_eq!(snapshot.find_many(&[20, 10]).unwrap().len(), 2);
    }

    #[test]
    fn test_keyed_on_unconvertible_field_rejected() {
        let err = Snapshot::build_keyed(vec![LookupValue::new(1, "Zed")], 1, "value")
            .unwrap_err();
        assert!(matches!(err, CacheError::BackingStore { .. }));
        assert!(err.to_string().contains("value"));

        let err = Snapshot::build_keyed(vec![LookupValue::new(1, "One")], 1, "missing")
            .unwrap_err();
        assert!(matches!(err, CacheError::BackingStore { .. }));
    }

    #[test]
    fn test_find_many_uses_list_order() {
        let snapshot = sample();
        let found = snapshot.find_many(&[3, 1]).unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_find_many_collapses_duplicates() {
        let snapshot = sample();
        let found = snapshot.find_many(&[2, 2, 2]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_find_many_reports_every_missing_id() {
        let snapshot = sample();
        let err = snapshot.find_many(&[1, 98, 99, 98]).unwrap_err();
        assert_eq!(
            err.missing_ids(),
            Some(&["98".to_string(), "99".to_string()][..])
        );
    }

    #[test]
    fn test_find_many_empty_input() {
        let err = sample().find_many(&[]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::<LookupValue>::build(Vec::new(), 1).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.get(&1).is_none());
    }
}
