//! Dispatch Batch Repository
//!
//! 签名、派发、送达都是带状态条件的更新，返回是否命中。

use super::RepoResult;
use shared::models::{DispatchBatch, DispatchSigner};
use sqlx::{SqliteExecutor, SqlitePool};

pub struct NewBatch<'a> {
    pub batch_id: &'a str,
    pub state: &'a str,
    pub card_count: i64,
    pub batch_arn: Option<&'a str>,
    pub created_by: &'a str,
    pub created_at: i64,
}

pub async fn insert(executor: impl SqliteExecutor<'_>, batch: NewBatch<'_>) -> RepoResult<DispatchBatch> {
    let created = sqlx::query_as::<_, DispatchBatch>(
        "INSERT INTO dispatch_batches (batch_id, state, card_count, batch_arn, status, created_by, created_at) \
         VALUES (?, ?, ?, ?, 'prepared', ?, ?) RETURNING *",
    )
    .bind(batch.batch_id)
    .bind(batch.state)
    .bind(batch.card_count)
    .bind(batch.batch_arn)
    .bind(batch.created_by)
    .bind(batch.created_at)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub async fn find_by_batch_id(
    executor: impl SqliteExecutor<'_>,
    batch_id: &str,
) -> RepoResult<Option<DispatchBatch>> {
    let batch = sqlx::query_as::<_, DispatchBatch>("SELECT * FROM dispatch_batches WHERE batch_id = ?")
        .bind(batch_id)
        .fetch_optional(executor)
        .await?;
    Ok(batch)
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<DispatchBatch>> {
    let batches = sqlx::query_as::<_, DispatchBatch>(
        "SELECT * FROM dispatch_batches ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(batches)
}

/// 记录签名。槽位已有签名时只有 `overwrite` 才会覆盖；已派发/送达的批次不可签。
pub async fn record_signature(
    executor: impl SqliteExecutor<'_>,
    batch_id: &str,
    signer: DispatchSigner,
    name: &str,
    note_path: Option<&str>,
    overwrite: bool,
    now: i64,
) -> RepoResult<bool> {
    let (name_col, at_col) = match signer {
        DispatchSigner::Operator => ("operator_name", "operator_signed_at"),
        DispatchSigner::Officer => ("officer_name", "officer_signed_at"),
    };
    let sql = format!(
        "UPDATE dispatch_batches SET {name_col} = ?1, {at_col} = ?2, \
         delivery_note_path = COALESCE(?3, delivery_note_path) \
         WHERE batch_id = ?4 AND status IN ('prepared', 'ready_for_dispatch') \
         AND ({name_col} IS NULL OR ?5)"
    );
    let result = sqlx::query(&sql)
        .bind(name)
        .bind(now)
        .bind(note_path)
        .bind(batch_id)
        .bind(overwrite)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// prepared → ready_for_dispatch (双方签名齐全时)
pub async fn promote_ready(executor: impl SqliteExecutor<'_>, batch_id: &str) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE dispatch_batches SET status = 'ready_for_dispatch' \
         WHERE batch_id = ? AND status = 'prepared' \
         AND operator_name IS NOT NULL AND officer_name IS NOT NULL",
    )
    .bind(batch_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// ready_for_dispatch → dispatched
pub async fn mark_dispatched(
    executor: impl SqliteExecutor<'_>,
    batch_id: &str,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE dispatch_batches SET status = 'dispatched', dispatched_at = ? \
         WHERE batch_id = ? AND status = 'ready_for_dispatch' \
         AND operator_name IS NOT NULL AND officer_name IS NOT NULL",
    )
    .bind(now)
    .bind(batch_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// dispatched → delivered
pub async fn mark_delivered(
    executor: impl SqliteExecutor<'_>,
    batch_id: &str,
    confirmation_path: &str,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE dispatch_batches SET status = 'delivered', delivered_at = ?, confirmation_note_path = ? \
         WHERE batch_id = ? AND status = 'dispatched'",
    )
    .bind(now)
    .bind(confirmation_path)
    .bind(batch_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_delivery_note_path(
    executor: impl SqliteExecutor<'_>,
    batch_id: &str,
    path: &str,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE dispatch_batches SET delivery_note_path = ? WHERE batch_id = ? AND status != 'delivered'",
    )
    .bind(path)
    .bind(batch_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
