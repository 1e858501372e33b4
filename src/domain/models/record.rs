//! Record abstraction shared by the cache, the loaders and the resolver.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A row of a cached reference collection.
///
/// Implementors expose their identifier and a fixed set of named fields.
/// The field set is what the cache can answer equality lookups for without
/// going back to the backing store.
pub trait Record: Clone + Send + Sync + 'static {
    /// Identifier type; unique within a collection.
    type Id: RecordKey;

    /// Collection (table) name.
    const COLLECTION: &'static str;

    /// Field holding [`Record::record_id`]. A collection may be configured
    /// to key on another field of the same identifier type.
    const ID_FIELD: &'static str = "id";

    /// Names of the fields reachable through [`Record::field`].
    const FIELDS: &'static [&'static str];

    /// The record's identifier.
    fn record_id(&self) -> Self::Id;

    /// Value of a named field, `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// A value usable as a cache key.
///
/// `from_field` turns the value of a configured identifier field into a key,
/// converting the way `SQLite` converts a value stored under a column of the
/// key's type.
pub trait RecordKey: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static {
    /// Key for a field value; `None` when the value cannot be one.
    fn from_field(value: &FieldValue) -> Option<Self>;
}

impl RecordKey for i64 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Bool(b) => Some(Self::from(*b)),
            FieldValue::Real(r) if r.fract() == 0.0 && r.abs() < 9.0e15 => Some(*r as Self),
            FieldValue::Text(s) => FieldValue::parse_numeric(s).and_then(|n| Self::from_field(&n)),
            FieldValue::Real(_) | FieldValue::Null => None,
        }
    }
}

impl RecordKey for String {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            other => other.as_sql_text(),
        }
    }
}

/// Typed value of a single record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL `NULL`.
    Null,
    /// Boolean, stored by `SQLite` as 0 or 1.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Floating point number.
    Real(f64),
    /// Text.
    Text(String),
}

impl FieldValue {
    /// True for [`FieldValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality as `SQLite` evaluates `column = ?` (or `IS NULL` for a null
    /// query) when `self` is the stored column value.
    ///
    /// Numbers compare by value across integer, real and boolean. Text
    /// compared with a numeric column converts to a number when it parses as
    /// one; a number compared with a text column converts to text.
    pub fn sql_eq(&self, query: &Self) -> bool {
        match (self, query) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(stored), Self::Text(wanted)) => stored == wanted,
            (Self::Text(stored), number) => number.as_sql_text().as_deref() == Some(stored.as_str()),
            (number, Self::Text(wanted)) => {
                Self::parse_numeric(wanted).is_some_and(|parsed| number.numeric_eq(&parsed))
            }
            (left, right) => left.numeric_eq(right),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn numeric_eq(&self, other: &Self) -> bool {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self, other) {
                (Self::Real(a), Self::Real(b)) => a == b,
                (Self::Real(a), other) | (other, Self::Real(a)) => {
                    other.as_integer().is_some_and(|b| *a == b as f64)
                }
                _ => false,
            },
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Text form `SQLite` gives a number compared against a text column.
    fn as_sql_text(&self) -> Option<String> {
        match self {
            Self::Integer(i) => Some(i.to_string()),
            Self::Bool(b) => Some(i64::from(*b).to_string()),
            Self::Real(r) if r.is_finite() && r.fract() == 0.0 => Some(format!("{r:.1}")),
            Self::Real(r) => Some(r.to_string()),
            Self::Text(_) | Self::Null => None,
        }
    }

    /// Numeric reading of text, as `SQLite` applies numeric affinity.
    #[allow(clippy::cast_possible_truncation)]
    fn parse_numeric(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Self::Integer(i));
        }
        text.parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .map(|r| {
                if r.fract() == 0.0 && r.abs() < 9.0e15 {
                    Self::Integer(r as i64)
                } else {
                    Self::Real(r)
                }
            })
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
