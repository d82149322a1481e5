//! Jurisdiction (State) Repository

use super::RepoResult;
use shared::models::Jurisdiction;
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Jurisdiction>> {
    let states = sqlx::query_as::<_, Jurisdiction>(
        "SELECT id, name, created_at FROM states ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(states)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Jurisdiction>> {
    let state =
        sqlx::query_as::<_, Jurisdiction>("SELECT id, name, created_at FROM states WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(state)
}

pub async fn exists(executor: impl SqliteExecutor<'_>, name: &str) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM states WHERE name = ? LIMIT 1")
        .bind(name)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

pub async fn create(executor: impl SqliteExecutor<'_>, name: &str) -> RepoResult<Jurisdiction> {
    let state = sqlx::query_as::<_, Jurisdiction>(
        "INSERT INTO states (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
    )
    .bind(name)
    .bind(shared::util::now_millis())
    .fetch_one(executor)
    .await?;
    Ok(state)
}

pub async fn delete(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM states WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
