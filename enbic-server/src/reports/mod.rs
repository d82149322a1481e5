//! 报表
//!
//! `/api/reports/{type}` 的查询与分页。日期过滤按业务时区解析，`date_to` 包含当天。

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use shared::models::{Arn, ArnStatus, ReportPage, ReportQuery, ReportType};
use shared::util::{age_days, now_millis};
use shared::{AppError, AppResult};
use sqlx::SqlitePool;

use crate::db::repository::report::{self, ReportFilter};
use crate::utils::time::date_range_millis;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

fn to_row<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("Failed to render report row: {e}")))
}

/// ARN 行，附带以天为单位的滞留时长
fn arn_row(arn: &Arn, since: i64, now: i64) -> AppResult<Value> {
    let mut row = to_row(arn)?;
    if let Value::Object(map) = &mut row {
        let days = (age_days(since, now) * 10.0).round() / 10.0;
        map.insert("age_days".into(), Value::from(days));
    }
    Ok(row)
}

fn build_filter(query: &ReportQuery, tz: Tz) -> AppResult<(ReportFilter, i64, i64)> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let (from, to) = date_range_millis(query.date_from.as_deref(), query.date_to.as_deref(), tz)?;
    let trimmed = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok((
        ReportFilter {
            search: trimmed(&query.search),
            state: trimmed(&query.state),
            from,
            to,
            limit: page_size,
            offset: (page - 1).saturating_mul(page_size),
        },
        page,
        page_size,
    ))
}

pub async fn report(
    pool: &SqlitePool,
    report_type: &str,
    query: &ReportQuery,
    tz: Tz,
) -> AppResult<ReportPage> {
    let report_type: ReportType = report_type
        .parse()
        .map_err(|e: String| AppError::invalid_request(e).with_detail("type", report_type))?;
    let (filter, page, page_size) = build_filter(query, tz)?;
    let now = now_millis();

    let (total, rows) = match report_type {
        ReportType::PendingCapture => {
            let (total, arns) = report::arns_by_status(
                pool,
                ArnStatus::AwaitingCapture,
                &filter,
                "created_at",
                "created_at ASC, id ASC",
            )
            .await?;
            let rows = arns
                .iter()
                .map(|a| arn_row(a, a.created_at, now))
                .collect::<AppResult<Vec<_>>>()?;
            (total, rows)
        }
        ReportType::Submitted => {
            let (total, arns) = report::arns_by_status(
                pool,
                ArnStatus::SubmittedToPersonalization,
                &filter,
                "submitted_at",
                "submitted_at DESC, id DESC",
            )
            .await?;
            (total, arns.iter().map(to_row).collect::<AppResult<Vec<_>>>()?)
        }
        ReportType::PendingDelivery => {
            let (total, arns) = report::arns_by_status(
                pool,
                ArnStatus::PendingDelivery,
                &filter,
                "pending_delivery_at",
                "pending_delivery_at ASC, id ASC",
            )
            .await?;
            let rows = arns
                .iter()
                .map(|a| arn_row(a, a.pending_delivery_at.unwrap_or(a.created_at), now))
                .collect::<AppResult<Vec<_>>>()?;
            (total, rows)
        }
        ReportType::DeliveryHistory => {
            let (total, history) = report::delivery_history(pool, &filter).await?;
            (total, history.iter().map(to_row).collect::<AppResult<Vec<_>>>()?)
        }
        ReportType::ActivityLog => {
            let (total, entries) = report::activity_log(pool, &filter).await?;
            (total, entries.iter().map(to_row).collect::<AppResult<Vec<_>>>()?)
        }
    };

    Ok(ReportPage {
        report_type,
        total,
        page,
        page_size,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{repository, test_pool};
    use crate::test_support::{age_arn, seed_arn, seed_state};
    use shared::ErrorCode;

    #[tokio::test]
    async fn test_unknown_report_type() {
        let pool = test_pool().await;
        let err = report(&pool, "inventory", &ReportQuery::default(), chrono_tz::UTC)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_pending_capture_has_age_days() {
        let pool = test_pool().await;
        seed_state(&pool, "Lagos").await;
        seed_state(&pool, "Kano").await;
        seed_arn(&pool, "A-1", "Lagos", ArnStatus::AwaitingCapture).await;
        seed_arn(&pool, "A-2", "Kano", ArnStatus::AwaitingCapture).await;
        seed_arn(&pool, "A-3", "Lagos", ArnStatus::Delivered).await;
        age_arn(&pool, "A-1", 5).await;
        age_arn(&pool, "A-2", 2).await;

        let page = report(&pool, "pending-capture", &ReportQuery::default(), chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.rows[0]["arn"], "A-1");
        let age = page.rows[0]["age_days"].as_f64().unwrap();
        assert!((4.9..=5.1).contains(&age));

        let lagos = report(
            &pool,
            "pending-capture",
            &ReportQuery {
                state: Some("Lagos".into()),
                ..Default::default()
            },
            chrono_tz::UTC,
        )
        .await
        .unwrap();
        assert_eq!(lagos.total, 1);
    }

    #[tokio::test]
    async fn test_paging_and_page_size_cap() {
        let pool = test_pool().await;
        seed_state(&pool, "Lagos").await;
        for i in 0..5 {
            seed_arn(&pool, &format!("P-{i}"), "Lagos", ArnStatus::PendingDelivery).await;
        }

        let page = report(
            &pool,
            "pending-delivery",
            &ReportQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            },
            chrono_tz::UTC,
        )
        .await
        .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.rows.len(), 2);

        let capped = report(
            &pool,
            "pending-delivery",
            &ReportQuery {
                page_size: Some(10_000),
                ..Default::default()
            },
            chrono_tz::UTC,
        )
        .await
        .unwrap();
        assert_eq!(capped.page_size, MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_activity_log_and_history() {
        let pool = test_pool().await;
        seed_state(&pool, "Lagos").await;
        for i in 0..3 {
            repository::audit::append(&pool, Some("A-1"), "STATUS_UPDATED", None, Some("x"), "ada", i)
                .await
                .unwrap();
        }
        repository::delivery::insert(&pool, "Lagos", 4, Some("van"), None, 10)
            .await
            .unwrap();

        let log = report(&pool, "activity-log", &ReportQuery::default(), chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(log.total, 3);
        assert_eq!(log.rows[0]["timestamp"], 2);

        let history = report(&pool, "delivery-history", &ReportQuery::default(), chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(history.total, 1);
        assert_eq!(history.rows[0]["arn_count"], 4);
    }
}
