//! Change record repository implementation
//!
//! The outbox of store changes. Writers append within the transaction that
//! performs the store write; the dispatcher fetches batches ordered by `seq`
//! and deletes them only after the whole batch has been processed. Sequence
//! values are allocated at insert, not commit, so strict cross-batch order
//! is not guaranteed (see `fetch_batch`).

use sqlx::{PgConnection, PgPool};
use crate::models::change::{ChangeEntity, ChangeOperation, ChangeRecord};
use crate::utils::errors::AppError;

#[derive(Debug, Clone)]
pub struct ChangeRepository {
    pool: PgPool,
}

impl ChangeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a change record inside an open transaction
    pub async fn append(
        conn: &mut PgConnection,
        entity: ChangeEntity,
        operation: ChangeOperation,
        old_value: Option<&serde_json::Value>,
        new_value: &serde_json::Value,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO change_records (entity, operation, old_value, new_value) VALUES ($1, $2, $3, $4)"
        )
        .bind(entity.as_str())
        .bind(operation.as_str())
        .bind(old_value)
        .bind(new_value)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Fetch the oldest unprocessed records ordered by `seq`.
    ///
    /// `seq` comes from a sequence, so a still-uncommitted transaction can
    /// hold a lower value than rows already visible here. Such a gap row is
    /// fetched once committed; acknowledgment deletes only the seqs of the
    /// batch that was actually processed, so the gap row cannot be swept
    /// away unprocessed. The stream is at-least-once and near-ordered, not
    /// strictly ordered across batches.
    pub async fn fetch_batch(&self, limit: i64) -> Result<Vec<ChangeRecord>, AppError> {
        let records = sqlx::query_as::<_, ChangeRecord>(
            "SELECT seq, entity, operation, old_value, new_value, created_at FROM change_records ORDER BY seq ASC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Acknowledge a processed batch by deleting exactly its records
    pub async fn delete_batch(&self, seqs: &[i64]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM change_records WHERE seq = ANY($1)")
            .bind(seqs)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
