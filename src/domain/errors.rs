//! Domain errors for the record cache.

use std::fmt;

use thiserror::Error;

/// Why a lookup produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The lookup was made without any identifier.
    MissingId,
    /// These identifiers are not present in the current snapshot.
    Ids(Vec<String>),
    /// No record satisfied the condition described by the string.
    NoMatch(String),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => f.write_str("no identifier given"),
            Self::Ids(ids) if ids.is_empty() => f.write_str("empty identifier list"),
            Self::Ids(ids) => write!(f, "unresolved ids: {}", ids.join(", ")),
            Self::NoMatch(condition) => write!(f, "no record matching {condition}"),
        }
    }
}

/// Errors surfaced by the cache, the loader and the reference resolver.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A lookup produced no record.
    #[error("{collection}: record not found ({reason})")]
    NotFound {
        /// Collection the lookup ran against.
        collection: String,
        /// What was looked up.
        reason: NotFoundReason,
    },

    /// The cache was read before its first successful load.
    #[error("{collection}: cache has not been loaded")]
    NotSetup {
        /// Collection whose cache is empty.
        collection: String,
    },

    /// The store could not be read, or returned a collection that cannot be indexed.
    #[error("{collection}: backing store error: {message}")]
    BackingStore {
        /// Collection being read.
        collection: String,
        /// Underlying failure.
        message: String,
    },

    /// A reference was resolved while its foreign key is unset.
    #[error("{holder}.{field} is not set")]
    DanglingReference {
        /// Collection holding the reference.
        holder: String,
        /// Foreign key field.
        field: String,
    },

    /// A table or field name is unsafe to splice into SQL, or not a field of the record.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
    pub(crate) fn missing_id(collection: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            reason: NotFoundReason::MissingId,
        }
    }

    pub(crate) fn unresolved<I: fmt::Display>(collection: &str, ids: &[I]) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            reason: NotFoundReason::Ids(ids.iter().map(ToString::to_string).collect()),
        }
    }

    pub(crate) fn no_match(collection: &str, condition: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            reason: NotFoundReason::NoMatch(condition.into()),
        }
    }

    pub(crate) fn not_setup(collection: &str) -> Self {
        Self::NotSetup {
            collection: collection.to_string(),
        }
    }

    pub(crate) fn backing_store(collection: &str, message: impl Into<String>) -> Self {
        Self::BackingStore {
            collection: collection.to_string(),
            message: message.into(),
        }
    }

    /// True for every flavour of "lookup found nothing".
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Identifiers that failed to resolve, if this is an id lookup miss.
    pub fn missing_ids(&self) -> Option<&[String]> {
        match self {
            Self::NotFound {
                reason: NotFoundReason::Ids(ids),
                ..
            } => Some(ids),
            _ => None,
        }
    }
}
