//! ARN Repository
//!
//! 状态变更全部是条件更新 (`WHERE status = ?`)，调用方根据影响行数判断是否抢到转换。
//! 时间戳使用 `COALESCE(existing, now)`，只写一次。

use super::RepoResult;
use shared::models::{Arn, ArnQuery, ArnStatus, DeliveryStat};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

/// 进入某状态时写入的时间戳列 (初始状态对应 created_at，已有值不会被覆盖)
fn stamp_column(status: ArnStatus) -> &'static str {
    match status {
        ArnStatus::AwaitingCapture => "created_at",
        ArnStatus::SubmittedToPersonalization => "submitted_at",
        ArnStatus::PendingDelivery => "pending_delivery_at",
        ArnStatus::Delivered => "delivered_at",
        ArnStatus::CollectedAtShq => "collected_at",
        ArnStatus::Stored => "stored_at",
    }
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    state: &str,
    name: Option<&str>,
    now: i64,
) -> RepoResult<Arn> {
    let created = sqlx::query_as::<_, Arn>(
        "INSERT INTO arns (arn, name, state, status, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(arn)
    .bind(name)
    .bind(state)
    .bind(ArnStatus::AwaitingCapture)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub async fn find_by_arn(executor: impl SqliteExecutor<'_>, arn: &str) -> RepoResult<Option<Arn>> {
    let found = sqlx::query_as::<_, Arn>("SELECT * FROM arns WHERE arn = ?")
        .bind(arn)
        .fetch_optional(executor)
        .await?;
    Ok(found)
}

pub async fn list(pool: &SqlitePool, filter: &ArnQuery) -> RepoResult<Vec<Arn>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM arns WHERE 1 = 1");
    if let Some(state) = filter.state.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND state = ").push_bind(state.to_string());
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(" AND (arn LIKE ")
            .push_bind(pattern.clone())
            .push(" OR name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR document_number LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY created_at DESC, id DESC");

    let arns = qb.build_query_as::<Arn>().fetch_all(pool).await?;
    Ok(arns)
}

/// 条件状态转换，返回是否命中
pub async fn transition(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    from: ArnStatus,
    to: ArnStatus,
    now: i64,
) -> RepoResult<bool> {
    let column = stamp_column(to);
    let sql = format!(
        "UPDATE arns SET status = ?1, {column} = COALESCE({column}, ?2) WHERE arn = ?3 AND status = ?4"
    );
    let result = sqlx::query(&sql)
        .bind(to)
        .bind(now)
        .bind(arn)
        .bind(from)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_document_number(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    document_number: &str,
    set_by: &str,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE arns SET document_number = ?, document_number_set_by = ?, document_number_set_at = ? \
         WHERE arn = ? AND status IN ('Submitted to Personalization', 'Pending Delivery')",
    )
    .bind(document_number)
    .bind(set_by)
    .bind(now)
    .bind(arn)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// 将某辖区所有 Pending Delivery 的 ARN 标记为 Delivered，返回被更新的 ARN
pub async fn deliver_all_pending_in_state(
    executor: impl SqliteExecutor<'_>,
    state: &str,
    now: i64,
) -> RepoResult<Vec<String>> {
    let arns: Vec<String> = sqlx::query_scalar(
        "UPDATE arns SET status = 'Delivered', delivered_at = COALESCE(delivered_at, ?) \
         WHERE state = ? AND status = 'Pending Delivery' RETURNING arn",
    )
    .bind(now)
    .bind(state)
    .fetch_all(executor)
    .await?;
    Ok(arns)
}

/// 入库: Submitted to Personalization / Stored → Pending Delivery
pub async fn receive_into_store(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE arns SET status = 'Pending Delivery', \
         stored_at = COALESCE(stored_at, ?1), pending_delivery_at = COALESCE(pending_delivery_at, ?1) \
         WHERE arn = ?2 AND status IN ('Submitted to Personalization', 'Stored')",
    )
    .bind(now)
    .bind(arn)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// SHQ 自提: Pending Delivery → Collected at SHQ
pub async fn collect_at_shq(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    collector_name: Option<&str>,
    collector_id: Option<&str>,
    collector_phone: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE arns SET status = 'Collected at SHQ', collected_at = COALESCE(collected_at, ?), \
         collector_name = ?, collector_id = ?, collector_phone = ? \
         WHERE arn = ? AND status = 'Pending Delivery'",
    )
    .bind(now)
    .bind(collector_name)
    .bind(collector_id)
    .bind(collector_phone)
    .bind(arn)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_delivery_note_path(
    executor: impl SqliteExecutor<'_>,
    arn: &str,
    path: &str,
) -> RepoResult<()> {
    sqlx::query("UPDATE arns SET delivery_note_path = ? WHERE arn = ?")
        .bind(path)
        .bind(arn)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn list_pending_in_state(
    executor: impl SqliteExecutor<'_>,
    state: &str,
) -> RepoResult<Vec<String>> {
    let arns = sqlx::query_scalar(
        "SELECT arn FROM arns WHERE state = ? AND status = 'Pending Delivery' ORDER BY arn",
    )
    .bind(state)
    .fetch_all(executor)
    .await?;
    Ok(arns)
}

pub async fn count_in_state(executor: impl SqliteExecutor<'_>, state: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM arns WHERE state = ?")
        .bind(state)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

pub async fn delivery_stats(pool: &SqlitePool) -> RepoResult<Vec<DeliveryStat>> {
    let stats = sqlx::query_as::<_, DeliveryStat>(
        "SELECT state, COUNT(*) AS pending_count, MIN(created_at) AS oldest_pending \
         FROM arns WHERE status = 'Pending Delivery' GROUP BY state ORDER BY state",
    )
    .fetch_all(pool)
    .await?;
    Ok(stats)
}
