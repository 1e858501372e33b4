//! Generic `SQLite` snapshot loader.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use super::utils::sql_identifier;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{CollectionConfig, FieldValue, Record};
use crate::domain::ports::RecordLoader;

/// `SQLite` implementation of `RecordLoader` using sqlx
///
/// Reads the table named by `R::COLLECTION`, ordered by the configured
/// identifier field. The cache built over this loader is keyed on the same
/// field.
pub struct SqliteRecordLoader<R> {
    pool: SqlitePool,
    identifier_field: String,
    load_sql: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> fmt::Debug for SqliteRecordLoader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRecordLoader")
            .field("collection", &R::COLLECTION)
            .field("identifier_field", &self.identifier_field)
            .finish_non_exhaustive()
    }
}

impl<R> SqliteRecordLoader<R>
where
    R: Record + for<'r> FromRow<'r, SqliteRow> + Unpin,
{
    /// Create a loader for `R`'s table
    ///
    /// # Arguments
    /// * `pool` - `SQLite` connection pool
    /// * `config` - Collection settings; the identifier field must be one of
    ///   `R::FIELDS`
    pub fn new(pool: SqlitePool, config: &CollectionConfig) -> CacheResult<Self> {
        let table = sql_identifier(R::COLLECTION)?;
        let identifier_field = sql_identifier(&config.identifier_field)?;
        if !R::FIELDS.iter().any(|f| *f == identifier_field) {
            return Err(CacheError::InvalidIdentifier(identifier_field.to_string()));
        }

        let load_sql = format!("SELECT * FROM {table} ORDER BY {identifier_field} ASC");

        Ok(Self {
            pool,
            identifier_field: identifier_field.to_string(),
            load_sql,
            _record: PhantomData,
        })
    }

    fn store_error(err: &sqlx::Error) -> CacheError {
        CacheError::backing_store(R::COLLECTION, err.to_string())
    }
}

#[async_trait]
impl<R> RecordLoader<R> for SqliteRecordLoader<R>
where
    R: Record + for<'r> FromRow<'r, SqliteRow> + Unpin,
{
    async fn load_all(&self) -> CacheResult<Vec<R>> {
        sqlx::query_as::<_, R>(&self.load_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::store_error(&e))
    }

    async fn find_one_where(&self, field: &str, value: &FieldValue) -> CacheResult<Option<R>> {
        let table = sql_identifier(R::COLLECTION)?;
        let field = sql_identifier(field)?;
        let order = &self.identifier_field;

        let row = if value.is_null() {
            let sql = format!(
                "SELECT * FROM {table} WHERE {field} IS NULL ORDER BY {order} ASC LIMIT 1"
            );
            sqlx::query_as::<_, R>(&sql).fetch_optional(&self.pool).await
        } else {
            let sql =
                format!("SELECT * FROM {table} WHERE {field} = ? ORDER BY {order} ASC LIMIT 1");
            let query = sqlx::query_as::<_, R>(&sql);
            let query = match value {
                FieldValue::Bool(b) => query.bind(*b),
                FieldValue::Integer(i) => query.bind(*i),
                FieldValue::Real(r) => query.bind(*r),
                FieldValue::Text(s) => query.bind(s.as_str()),
                FieldValue::Null => query,
            };
            query.fetch_optional(&self.pool).await
        };

        row.map_err(|e| Self::store_error(&e))
    }

    fn identifier_field(&self) -> &str {
        &self.identifier_field
    }
}
