//! Database utility functions
//!
//! Table and column names cannot be bound as query parameters, so every name
//! spliced into SQL text goes through [`sql_identifier`] first.

use crate::domain::errors::{CacheError, CacheResult};

/// Accept `name` only if it is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Examples
/// ```
/// use tablecache::infrastructure::database::utils::sql_identifier;
///
/// assert!(sql_identifier("lookup_values").is_ok());
/// assert!(sql_identifier("id; DROP TABLE x").is_err());
/// ```
pub fn sql_identifier(name: &str) -> CacheResult<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest {
        Ok(name)
    } else {
        Err(CacheError::InvalidIdentifier(name.to_string()))
    }
}
