//! 区间对账
//!
//! `expected = opening + received + adjustments − issued − damaged − lost`

use chrono_tz::Tz;
use shared::models::{MovementType, ReconcileQuery, Reconciliation};
use shared::{AppError, AppResult};
use sqlx::SqlitePool;

use crate::auth::Actor;
use crate::db::repository;
use crate::utils::time::date_range_millis;

/// 分区过滤：`None` 为全部台账，`Some(None)` 为中央库
pub type PartitionScope = Option<Option<i64>>;

/// 解析 `central` / officer id；officer 强制使用自己的分区
pub fn resolve_scope(raw: Option<&str>, actor: &Actor) -> AppResult<PartitionScope> {
    if let Some(own) = actor.partition() {
        return Ok(Some(Some(own)));
    }
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some("central") => Ok(Some(None)),
        Some(id) => id
            .parse::<i64>()
            .map(|id| Some(Some(id)))
            .map_err(|_| {
                AppError::invalid_request(format!(
                    "Invalid partition: {id} (expected \"central\" or a user id)"
                ))
                .with_detail("partition", id)
            }),
    }
}

/// 由期初与各类型带符号合计计算对账结果
pub fn summarize(opening: i64, totals: &[(MovementType, i64)]) -> Reconciliation {
    let mut r = Reconciliation {
        opening,
        ..Default::default()
    };
    for (kind, sum) in totals {
        match kind {
            MovementType::Received | MovementType::ReceivedFromIssue => r.received += sum,
            MovementType::Issued => r.issued += -sum,
            MovementType::Damaged => r.damaged += -sum,
            MovementType::Lost => r.lost += -sum,
            MovementType::Adjustment => r.adjustments += sum,
        }
    }
    r.expected = r.opening + r.received + r.adjustments - r.issued - r.damaged - r.lost;
    r
}

pub async fn reconcile(
    pool: &SqlitePool,
    query: &ReconcileQuery,
    actor: &Actor,
    tz: Tz,
) -> AppResult<Reconciliation> {
    let scope = resolve_scope(query.partition.as_deref(), actor)?;
    let (from, to) = date_range_millis(query.date_from.as_deref(), query.date_to.as_deref(), tz)?;

    let opening = match from {
        Some(from) => repository::movement::sum_before(pool, scope, from).await?,
        None => 0,
    };
    let totals = repository::movement::totals_by_type(pool, scope, from, to).await?;
    Ok(summarize(opening, &totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::test_support::{officer, operator, supervisor};
    use shared::models::Role;

    #[test]
    fn test_summarize_arithmetic() {
        let r = summarize(
            10,
            &[
                (MovementType::Received, 100),
                (MovementType::ReceivedFromIssue, 20),
                (MovementType::Issued, -50),
                (MovementType::Damaged, -3),
                (MovementType::Lost, -2),
                (MovementType::Adjustment, -5),
            ],
        );
        assert_eq!(
            r,
            Reconciliation {
                opening: 10,
                received: 120,
                issued: 50,
                damaged: 3,
                lost: 2,
                adjustments: -5,
                expected: 70,
            }
        );
    }

    #[test]
    fn test_resolve_scope() {
        let op = operator();
        assert_eq!(resolve_scope(None, &op).unwrap(), None);
        assert_eq!(resolve_scope(Some("central"), &op).unwrap(), Some(None));
        assert_eq!(resolve_scope(Some(" 7 "), &op).unwrap(), Some(Some(7)));
        assert!(resolve_scope(Some("north"), &op).is_err());

        let officer = Actor::new(42, "o", Role::Officer);
        assert_eq!(resolve_scope(Some("central"), &officer).unwrap(), Some(Some(42)));
    }

    async fn post(pool: &SqlitePool, kind: MovementType, qty: i64, user_id: Option<i64>, at: i64) {
        repository::movement::insert(
            pool,
            repository::movement::NewMovement {
                movement_type: kind,
                qty,
                reference: None,
                related_request_id: None,
                operator: "test",
                user_id,
                notes: None,
                created_at: at,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_reconcile_window_and_partition() {
        let pool = test_pool().await;
        let officer = officer(&pool, "officer1").await;
        // 2024-01-01T00:00:00Z = 1_704_067_200_000
        let jan1 = 1_704_067_200_000;
        let day = 86_400_000;

        post(&pool, MovementType::Received, 100, None, jan1 - day).await;
        post(&pool, MovementType::Issued, -30, None, jan1 + 1000).await;
        post(&pool, MovementType::Damaged, -5, None, jan1 + day).await;
        post(&pool, MovementType::Received, 50, None, jan1 + 5 * day).await;
        post(&pool, MovementType::Received, 9, Some(officer.id), jan1).await;

        let query = ReconcileQuery {
            date_from: Some("2024-01-01".into()),
            date_to: Some("2024-01-02".into()),
            partition: Some("central".into()),
        };
        let r = reconcile(&pool, &query, &supervisor(), chrono_tz::UTC).await.unwrap();
        assert_eq!(r.opening, 100);
        assert_eq!(r.received, 0);
        assert_eq!(r.issued, 30);
        assert_eq!(r.damaged, 5);
        assert_eq!(r.expected, 65);

        let own = reconcile(&pool, &ReconcileQuery::default(), &officer, chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(own.received, 9);
        assert_eq!(own.expected, 9);

        let whole = reconcile(&pool, &ReconcileQuery::default(), &supervisor(), chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(whole.opening, 0);
        assert_eq!(whole.received, 159);
        assert_eq!(whole.expected, 124);

        let inverted = ReconcileQuery {
            date_from: Some("2024-02-01".into()),
            date_to: Some("2024-01-01".into()),
            partition: None,
        };
        assert!(reconcile(&pool, &inverted, &supervisor(), chrono_tz::UTC).await.is_err());
    }
}
