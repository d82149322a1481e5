//! Settings Repository (key/value)

use super::RepoResult;
use sqlx::SqliteExecutor;

pub const LOW_STOCK_THRESHOLD: &str = "low_stock_threshold";

pub async fn get(executor: impl SqliteExecutor<'_>, key: &str) -> RepoResult<Option<String>> {
    let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(value)
}

pub async fn set(executor: impl SqliteExecutor<'_>, key: &str, value: &str, now: i64) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
    )
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// 仅在缺失时写入默认值
pub async fn seed(executor: impl SqliteExecutor<'_>, key: &str, value: &str, now: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?) ON CONFLICT(key) DO NOTHING")
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}
