//! Write-side repositories for the lookup tables.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{LookupReference, LookupValue, Record};
use crate::domain::ports::{LookupReferenceRepository, LookupValueRepository};

fn store_error<R: Record>(err: &sqlx::Error) -> CacheError {
    CacheError::backing_store(R::COLLECTION, err.to_string())
}

/// `SQLite` implementation of `LookupValueRepository`
pub struct LookupValueRepositoryImpl {
    pool: SqlitePool,
}

impl LookupValueRepositoryImpl {
    /// Repository over `pool`.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupValueRepository for LookupValueRepositoryImpl {
    async fn create(&self, value: &str) -> CacheResult<LookupValue> {
        sqlx::query_as::<_, LookupValue>(
            "INSERT INTO lookup_values (value) VALUES (?) RETURNING id, value",
        )
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error::<LookupValue>(&e))
    }

    async fn delete(&self, id: i64) -> CacheResult<bool> {
        let result = sqlx::query("DELETE FROM lookup_values WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error::<LookupValue>(&e))?;

        Ok(result.rows_affected() > 0)
    }
}

/// `SQLite` implementation of `LookupReferenceRepository`
pub struct LookupReferenceRepositoryImpl {
    pool: SqlitePool,
}

impl LookupReferenceRepositoryImpl {
    /// Repository over `pool`.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupReferenceRepository for LookupReferenceRepositoryImpl {
    async fn create(
        &self,
        lookup_value_id: Option<i64>,
        label: &str,
    ) -> CacheResult<LookupReference> {
        sqlx::query_as::<_, LookupReference>(
            r"
            INSERT INTO lookup_references (lookup_value_id, label)
            VALUES (?, ?)
            RETURNING id, lookup_value_id, label
            ",
        )
        .bind(lookup_value_id)
        .bind(label)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error::<LookupReference>(&e))
    }

    async fn get(&self, id: i64) -> CacheResult<Option<LookupReference>> {
        sqlx::query_as::<_, LookupReference>(
            "SELECT id, lookup_value_id, label FROM lookup_references WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error::<LookupReference>(&e))
    }

    async fn list_for_lookup_value(
        &self,
        lookup_value_id: i64,
    ) -> CacheResult<Vec<LookupReference>> {
        sqlx::query_as::<_, LookupReference>(
            r"
            SELECT id, lookup_value_id, label
            FROM lookup_references
            WHERE lookup_value_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(lookup_value_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error::<LookupReference>(&e))
    }
}
