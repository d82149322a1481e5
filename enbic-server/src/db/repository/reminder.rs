//! Reminder Repository
//!
//! 生成语句为 `INSERT ... SELECT ... WHERE NOT EXISTS ... ON CONFLICT DO NOTHING`，
//! 配合迁移中的部分唯一索引，重复或并发执行都不会产生重复的未解决提醒。

use super::RepoResult;
use shared::models::{ArnStatus, Reminder, ReminderType, ReminderView};
use sqlx::{SqliteExecutor, SqlitePool};

/// 为处于 `status` 的每个 ARN 补齐一条未解决的 `reminder_type` 提醒。
/// 消息为 `"ARN <arn> <message_tail>"`。
pub async fn ensure_for_status(
    executor: impl SqliteExecutor<'_>,
    reminder_type: ReminderType,
    status: ArnStatus,
    message_tail: &str,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "INSERT INTO reminders (arn, state, reminder_type, message, created_at) \
         SELECT a.arn, a.state, ?1, 'ARN ' || a.arn || ' ' || ?2, ?3 FROM arns a \
         WHERE a.status = ?4 AND NOT EXISTS ( \
             SELECT 1 FROM reminders r \
             WHERE r.reminder_type = ?1 AND r.arn = a.arn AND r.resolved_at IS NULL) \
         ON CONFLICT DO NOTHING",
    )
    .bind(reminder_type)
    .bind(message_tail)
    .bind(now)
    .bind(status)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// 为 Pending Delivery 数量达到阈值的每个辖区补齐一条辖区级提醒
pub async fn ensure_state_threshold(
    executor: impl SqliteExecutor<'_>,
    threshold: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "INSERT INTO reminders (arn, state, reminder_type, message, created_at) \
         SELECT NULL, a.state, ?1, \
                'State ' || a.state || ' has ' || COUNT(*) || ' cards pending delivery', ?2 \
         FROM arns a \
         WHERE a.status = 'Pending Delivery' AND NOT EXISTS ( \
             SELECT 1 FROM reminders r \
             WHERE r.reminder_type = ?1 AND r.arn IS NULL AND r.state = a.state AND r.resolved_at IS NULL) \
         GROUP BY a.state HAVING COUNT(*) >= ?3 \
         ON CONFLICT DO NOTHING",
    )
    .bind(ReminderType::StateDeliveryThreshold)
    .bind(now)
    .bind(threshold)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Reminder>> {
    let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(reminder)
}

/// 标记已解决；已解决的提醒不受影响
pub async fn resolve(executor: impl SqliteExecutor<'_>, id: i64, now: i64) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE reminders SET resolved_at = ? WHERE id = ? AND resolved_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn list_unresolved(pool: &SqlitePool) -> RepoResult<Vec<ReminderView>> {
    let rows = sqlx::query_as::<_, ReminderView>(
        "SELECT r.*, a.state AS arn_state, a.status AS arn_status \
         FROM reminders r LEFT JOIN arns a ON a.arn = r.arn \
         WHERE r.resolved_at IS NULL \
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_unresolved(
    executor: impl SqliteExecutor<'_>,
    reminder_type: ReminderType,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reminders WHERE reminder_type = ? AND resolved_at IS NULL",
    )
    .bind(reminder_type)
    .fetch_one(executor)
    .await?;
    Ok(count)
}
