//! Blank Card Request Repository

use super::RepoResult;
use shared::models::{BlankCardRequest, BlankCardRequestView, RequestStatus};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    requester_id: i64,
    quantity: i64,
    reason: Option<&str>,
    needed_by: Option<&str>,
    now: i64,
) -> RepoResult<BlankCardRequest> {
    let created = sqlx::query_as::<_, BlankCardRequest>(
        "INSERT INTO blank_card_requests (requester_id, quantity, reason, needed_by, status, approved_qty, created_at) \
         VALUES (?, ?, ?, ?, 'pending', 0, ?) RETURNING *",
    )
    .bind(requester_id)
    .bind(quantity)
    .bind(reason)
    .bind(needed_by)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<BlankCardRequest>> {
    let found = sqlx::query_as::<_, BlankCardRequest>("SELECT * FROM blank_card_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(found)
}

/// 仅 pending 的申请可以被决定
pub async fn decide(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    status: RequestStatus,
    approved_qty: i64,
    approver_id: i64,
    decision_note: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE blank_card_requests SET status = ?, approved_qty = ?, approver_id = ?, decision_note = ?, decided_at = ? \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(status)
    .bind(approved_qty)
    .bind(approver_id)
    .bind(decision_note)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// 带申请人用户名的列表，`requester` 为 Some 时只看该用户
pub async fn list(
    pool: &SqlitePool,
    requester: Option<i64>,
) -> RepoResult<Vec<BlankCardRequestView>> {
    let rows = sqlx::query_as::<_, BlankCardRequestView>(
        "SELECT r.*, u.username AS requester_name FROM blank_card_requests r \
         LEFT JOIN users u ON u.id = r.requester_id \
         WHERE ?1 IS NULL OR r.requester_id = ?1 \
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(requester)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
