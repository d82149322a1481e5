//! Delivery History Repository

use super::RepoResult;
use shared::models::DeliveryHistory;
use sqlx::SqliteExecutor;

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    state: &str,
    arn_count: i64,
    notes: Option<&str>,
    batch_id: Option<&str>,
    now: i64,
) -> RepoResult<DeliveryHistory> {
    let row = sqlx::query_as::<_, DeliveryHistory>(
        "INSERT INTO delivery_history (state, delivery_date, arn_count, operator_notes, batch_id) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(state)
    .bind(now)
    .bind(arn_count)
    .bind(notes)
    .bind(batch_id)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

pub async fn find_by_state(
    executor: impl SqliteExecutor<'_>,
    state: &str,
) -> RepoResult<Vec<DeliveryHistory>> {
    let rows = sqlx::query_as::<_, DeliveryHistory>(
        "SELECT * FROM delivery_history WHERE state = ? ORDER BY delivery_date DESC, id DESC",
    )
    .bind(state)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}
