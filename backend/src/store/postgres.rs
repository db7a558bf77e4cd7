//! PostgreSQL record store
//!
//! Every collection shares the `records` table: one JSONB document per row,
//! keyed by `(collection, id)`. The document holds the record's draft fields.

use std::marker::PhantomData;

use serde_json::Value;
use shared::Record;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};

use super::{not_found, RecordStore};
use crate::error::{AppError, AppResult};

pub struct PgStore<T> {
    db: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> PgStore<T> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }

    fn decode(id: i64, data: Value) -> AppResult<T> {
        let draft: T::Draft = serde_json::from_value(data).map_err(|e| {
            AppError::Internal(format!("Malformed {} {}: {}", T::RESOURCE, id, e))
        })?;
        Ok(T::from_draft(id, draft))
    }

    fn decode_row(row: PgRow) -> AppResult<T> {
        let id: i64 = row.try_get("id")?;
        let data: Value = row.try_get("data")?;
        Self::decode(id, data)
    }
}

#[axum::async_trait]
impl<T: Record> RecordStore<T> for PgStore<T> {
    async fn list_all(&self) -> AppResult<Vec<T>> {
        let rows = sqlx::query("SELECT id, data FROM records WHERE collection = $1 ORDER BY id")
            .bind(T::COLLECTION)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(Self::decode_row).collect()
    }

    async fn get_by_id(&self, id: i64) -> AppResult<T> {
        let row = sqlx::query("SELECT id, data FROM records WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        Self::decode_row(row)
    }

    async fn create(&self, draft: T::Draft) -> AppResult<T> {
        T::validate_draft(&draft)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO records (collection, data) VALUES ($1, $2) RETURNING id",
        )
        .bind(T::COLLECTION)
        .bind(Json(&draft))
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(collection = T::COLLECTION, id, "Record created");
        Ok(T::from_draft(id, draft))
    }

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T> {
        T::validate_patch(&patch)?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query(
            "SELECT id, data FROM records WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(T::COLLECTION)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

        let mut record = Self::decode_row(row)?;
        record.apply(patch);

        sqlx::query(
            "UPDATE records SET data = $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(T::COLLECTION)
        .bind(id)
        .bind(Json(&record))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(collection = T::COLLECTION, id, "Record updated");
        Ok(record)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<T>(id));
        }
        Ok(())
    }
}
