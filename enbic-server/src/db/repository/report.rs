//! Report Repository
//!
//! 报表查询：同一组过滤条件分别用于 COUNT 与分页查询。

use super::RepoResult;
use shared::models::{Arn, ArnStatus, AuditLogEntry, DeliveryHistory};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// 活动日志最多返回的行数
pub const ACTIVITY_LOG_CAP: i64 = 1000;

/// 已解析的报表过滤条件 (日期已换算为毫秒)
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub search: Option<String>,
    pub state: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    filter: &ReportFilter,
    date_column: &str,
    search_columns: &[&str],
    has_state: bool,
) {
    if has_state && let Some(state) = &filter.state {
        qb.push(" AND state = ").push_bind(state.clone());
    }
    if let Some(from) = filter.from {
        qb.push(format!(" AND {date_column} >= ")).push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(format!(" AND {date_column} <= ")).push_bind(to);
    }
    if let Some(search) = &filter.search
        && !search_columns.is_empty()
    {
        let pattern = format!("%{search}%");
        qb.push(" AND (");
        for (i, column) in search_columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("{column} LIKE ")).push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// 某状态下的 ARN 报表
pub async fn arns_by_status(
    pool: &SqlitePool,
    status: ArnStatus,
    filter: &ReportFilter,
    date_column: &str,
    order_by: &str,
) -> RepoResult<(i64, Vec<Arn>)> {
    const SEARCH: &[&str] = &["arn", "name", "document_number"];

    let mut count_qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM arns WHERE status = ");
    count_qb.push_bind(status);
    push_filters(&mut count_qb, filter, date_column, SEARCH, true);
    let total = count_qb.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM arns WHERE status = ");
    qb.push_bind(status);
    push_filters(&mut qb, filter, date_column, SEARCH, true);
    qb.push(format!(" ORDER BY {order_by} LIMIT "))
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let rows = qb.build_query_as::<Arn>().fetch_all(pool).await?;

    Ok((total, rows))
}

pub async fn delivery_history(
    pool: &SqlitePool,
    filter: &ReportFilter,
) -> RepoResult<(i64, Vec<DeliveryHistory>)> {
    const SEARCH: &[&str] = &["state", "operator_notes", "batch_id"];

    let mut count_qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM delivery_history WHERE 1 = 1");
    push_filters(&mut count_qb, filter, "delivery_date", SEARCH, true);
    let total = count_qb.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM delivery_history WHERE 1 = 1");
    push_filters(&mut qb, filter, "delivery_date", SEARCH, true);
    qb.push(" ORDER BY delivery_date DESC, id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let rows = qb.build_query_as::<DeliveryHistory>().fetch_all(pool).await?;

    Ok((total, rows))
}

/// 活动日志，最新在前，最多 [`ACTIVITY_LOG_CAP`] 行
pub async fn activity_log(
    pool: &SqlitePool,
    filter: &ReportFilter,
) -> RepoResult<(i64, Vec<AuditLogEntry>)> {
    const SEARCH: &[&str] = &["arn", "action", "operator", "new_value"];

    let mut count_qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM audit_log WHERE 1 = 1");
    push_filters(&mut count_qb, filter, "timestamp", SEARCH, false);
    let total = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?
        .min(ACTIVITY_LOG_CAP);

    let limit = filter.limit.min(ACTIVITY_LOG_CAP - filter.offset).max(0);
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM audit_log WHERE 1 = 1");
    push_filters(&mut qb, filter, "timestamp", SEARCH, false);
    qb.push(" ORDER BY timestamp DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let rows = qb.build_query_as::<AuditLogEntry>().fetch_all(pool).await?;

    Ok((total, rows))
}
