//! Stock Movement Repository
//!
//! 台账只追加。分区用 `user_id IS ?` 匹配：NULL 为中央库，否则为该 officer 的库存。

use super::RepoResult;
use shared::models::{MovementType, OfficerStock, StockMovement};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

pub struct NewMovement<'a> {
    pub movement_type: MovementType,
    pub qty: i64,
    pub reference: Option<&'a str>,
    pub related_request_id: Option<i64>,
    pub operator: &'a str,
    pub user_id: Option<i64>,
    pub notes: Option<&'a str>,
    pub created_at: i64,
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    movement: NewMovement<'_>,
) -> RepoResult<StockMovement> {
    let created = sqlx::query_as::<_, StockMovement>(
        "INSERT INTO stock_movements (type, qty, reference, related_request_id, operator, user_id, notes, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(movement.movement_type)
    .bind(movement.qty)
    .bind(movement.reference)
    .bind(movement.related_request_id)
    .bind(movement.operator)
    .bind(movement.user_id)
    .bind(movement.notes)
    .bind(movement.created_at)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub async fn balance(executor: impl SqliteExecutor<'_>, partition: Option<i64>) -> RepoResult<i64> {
    let total = sqlx::query_scalar("SELECT COALESCE(SUM(qty), 0) FROM stock_movements WHERE user_id IS ?")
        .bind(partition)
        .fetch_one(executor)
        .await?;
    Ok(total)
}

/// 某条流水之前的分区余额
pub async fn balance_before(
    executor: impl SqliteExecutor<'_>,
    partition: Option<i64>,
    movement_id: i64,
) -> RepoResult<i64> {
    let total = sqlx::query_scalar(
        "SELECT COALESCE(SUM(qty), 0) FROM stock_movements WHERE user_id IS ? AND id < ?",
    )
    .bind(partition)
    .bind(movement_id)
    .fetch_one(executor)
    .await?;
    Ok(total)
}

pub async fn officer_balances(pool: &SqlitePool) -> RepoResult<Vec<OfficerStock>> {
    let rows = sqlx::query_as::<_, OfficerStock>(
        "SELECT m.user_id AS user_id, u.username AS username, SUM(m.qty) AS balance \
         FROM stock_movements m JOIN users u ON u.id = m.user_id \
         GROUP BY m.user_id, u.username ORDER BY u.username",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 流水列表，最新在前。`partition` 为 None 时返回全部分区。
pub async fn list(
    pool: &SqlitePool,
    partition: Option<Option<i64>>,
    limit: i64,
) -> RepoResult<Vec<StockMovement>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM stock_movements");
    if let Some(partition) = partition {
        qb.push(" WHERE user_id IS ").push_bind(partition);
    }
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(limit);
    let rows = qb.build_query_as::<StockMovement>().fetch_all(pool).await?;
    Ok(rows)
}

/// 区间内按类型汇总 (signed sum)
pub async fn totals_by_type(
    pool: &SqlitePool,
    partition: Option<Option<i64>>,
    from: Option<i64>,
    to: Option<i64>,
) -> RepoResult<Vec<(MovementType, i64)>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT type, COALESCE(SUM(qty), 0) FROM stock_movements WHERE 1 = 1");
    push_scope(&mut qb, partition);
    if let Some(from) = from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
    qb.push(" GROUP BY type");
    let rows = qb.build_query_as::<(MovementType, i64)>().fetch_all(pool).await?;
    Ok(rows)
}

/// 期初: `before` 之前的全部流水之和
pub async fn sum_before(
    pool: &SqlitePool,
    partition: Option<Option<i64>>,
    before: i64,
) -> RepoResult<i64> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COALESCE(SUM(qty), 0) FROM stock_movements WHERE created_at < ");
    qb.push_bind(before);
    push_scope(&mut qb, partition);
    let total = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(total)
}

fn push_scope(qb: &mut QueryBuilder<'_, Sqlite>, partition: Option<Option<i64>>) {
    if let Some(partition) = partition {
        qb.push(" AND user_id IS ").push_bind(partition);
    }
}
