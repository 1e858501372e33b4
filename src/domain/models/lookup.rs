//! The reference dataset shipped with the crate.
//!
//! `LookupValue` is the cached collection. `LookupReference` is an unrelated
//! entity that points into it through `lookup_value_id`.

use serde::{Deserialize, Serialize};

use super::record::{FieldValue, Record};

/// A row of the `lookup_values` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct LookupValue {
    /// Row id.
    pub id: i64,
    /// Display value.
    pub value: String,
}

impl LookupValue {
    /// Build a value row.
    pub fn new(id: i64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

impl Record for LookupValue {
    type Id = i64;

    const COLLECTION: &'static str = "lookup_values";
    const FIELDS: &'static [&'static str] = &["id", "value"];

    fn record_id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "value" => Some(self.value.as_str().into()),
            _ => None,
        }
    }
}

/// A row of `lookup_references`, holding an optional foreign key into
/// `lookup_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LookupReference {
    /// Row id.
    pub id: i64,
    /// Referenced `lookup_values` row, if set.
    pub lookup_value_id: Option<i64>,
    /// Free-form label.
    pub label: String,
}

impl Record for LookupReference {
    type Id = i64;

    const COLLECTION: &'static str = "lookup_references";
    const FIELDS: &'static [&'static str] = &["id", "lookup_value_id", "label"];

    fn record_id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "lookup_value_id" => Some(self.lookup_value_id.into()),
            "label" => Some(self.label.as_str().into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_value_fields() {
        let record = LookupValue::new(2, "Two");
        assert_eq!(record.record_id(), 2);
        assert_eq!(record.field("value"), Some(FieldValue::Text("Two".into())));
        assert_eq!(record.field("id"), Some(FieldValue::Integer(2)));
        assert_eq!(record.field("colour"), None);
    }

    #[test]
    fn test_unset_foreign_key_is_null_field() {
        let reference = LookupReference {
            id: 1,
            lookup_value_id: None,
            label: "orphan".into(),
        };
        assert_eq!(reference.field("lookup_value_id"), Some(FieldValue::Null));
    }
}
