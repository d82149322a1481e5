//! User Repository

use super::RepoResult;
use shared::models::{Role, User};
use sqlx::SqliteExecutor;

pub async fn find_by_username(
    executor: impl SqliteExecutor<'_>,
    username: &str,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn list(executor: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
        .fetch_all(executor)
        .await?;
    Ok(users)
}

pub async fn count(executor: impl SqliteExecutor<'_>) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    username: &str,
    display_name: &str,
    password_hash: &str,
    role: Role,
    now: i64,
) -> RepoResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, display_name, password_hash, role, is_active, created_at) \
         VALUES (?, ?, ?, ?, 1, ?) RETURNING *",
    )
    .bind(username)
    .bind(display_name)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(user)
}
