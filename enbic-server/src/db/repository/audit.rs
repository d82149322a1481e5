//! Audit Log Repository (append-only)

use super::RepoResult;
use shared::models::AuditLogEntry;
use sqlx::SqliteExecutor;

pub async fn append(
    executor: impl SqliteExecutor<'_>,
    arn: Option<&str>,
    action: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    operator: &str,
    timestamp: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO audit_log (arn, action, old_value, new_value, timestamp, operator) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(arn)
    .bind(action)
    .bind(old_value)
    .bind(new_value)
    .bind(timestamp)
    .bind(operator)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_arn(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
) -> RepoResult<Vec<AuditLogEntry>> {
    let rows = sqlx::query_as::<_, AuditLogEntry>(
        "SELECT * FROM audit_log WHERE arn = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(arn)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}
