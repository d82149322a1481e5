//! Issue Note Repository

use super::RepoResult;
use shared::models::{IssueNote, IssueSigner};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    request_id: i64,
    quantity: i64,
    now: i64,
) -> RepoResult<IssueNote> {
    let created = sqlx::query_as::<_, IssueNote>(
        "INSERT INTO issue_notes (request_id, quantity, status, created_at) \
         VALUES (?, ?, 'pending_signatures', ?) RETURNING *",
    )
    .bind(request_id)
    .bind(quantity)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<IssueNote>> {
    let note = sqlx::query_as::<_, IssueNote>("SELECT * FROM issue_notes WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(note)
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<IssueNote>> {
    let notes = sqlx::query_as::<_, IssueNote>("SELECT * FROM issue_notes ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await?;
    Ok(notes)
}

pub async fn record_signature(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    signer: IssueSigner,
    name: &str,
    note_path: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let (name_col, at_col) = match signer {
        IssueSigner::Issuer => ("issuer_name", "issuer_signed_at"),
        IssueSigner::Receiver => ("receiver_name", "receiver_signed_at"),
    };
    let sql = format!(
        "UPDATE issue_notes SET {name_col} = ?1, {at_col} = ?2, issue_note_path = COALESCE(?3, issue_note_path) \
         WHERE id = ?4 AND status = 'pending_signatures'"
    );
    let result = sqlx::query(&sql)
        .bind(name)
        .bind(now)
        .bind(note_path)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// pending_signatures → completed，双方签名齐全时命中且只命中一次
pub async fn complete(executor: impl SqliteExecutor<'_>, id: i64, now: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE issue_notes SET status = 'completed', completed_at = ? \
         WHERE id = ? AND status = 'pending_signatures' \
         AND issuer_name IS NOT NULL AND receiver_name IS NOT NULL",
    )
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
