//! 提醒生成与解决

use shared::models::{
    ArnStatus, GenerateSummary, ReminderType, ReminderView, ResolveOutcome,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::FIELD_STAFF;
use crate::db::repository;
use crate::effects::{Effects, Outcome};
use crate::lifecycle::engine::advance;

const PENDING_CAPTURE_TAIL: &str = "is still awaiting capture and personalization submission";
const PENDING_PERSONALIZATION_TAIL: &str =
    "is submitted to personalization and awaiting store receipt";

/// 补齐所有缺失的未解决提醒，返回本次新建数量
pub async fn generate(pool: &SqlitePool, state_threshold: i64) -> AppResult<GenerateSummary> {
    let now = now_millis();
    let summary = GenerateSummary {
        pending_capture: repository::reminder::ensure_for_status(
            pool,
            ReminderType::PendingCapture,
            ArnStatus::AwaitingCapture,
            PENDING_CAPTURE_TAIL,
            now,
        )
        .await?,
        pending_personalization: repository::reminder::ensure_for_status(
            pool,
            ReminderType::PendingPersonalization,
            ArnStatus::SubmittedToPersonalization,
            PENDING_PERSONALIZATION_TAIL,
            now,
        )
        .await?,
        state_delivery_threshold: repository::reminder::ensure_state_threshold(
            pool,
            state_threshold.max(1),
            now,
        )
        .await?,
    };
    if summary.created() > 0 {
        tracing::info!(
            created = summary.created(),
            pending_capture = summary.pending_capture,
            pending_personalization = summary.pending_personalization,
            state_delivery_threshold = summary.state_delivery_threshold,
            "Reminders generated"
        );
    }
    Ok(summary)
}

/// 提醒对应的推进动作: (期望当前状态, 目标状态)
fn advancement(reminder_type: ReminderType) -> Option<(ArnStatus, ArnStatus)> {
    match reminder_type {
        ReminderType::PendingCapture => Some((
            ArnStatus::AwaitingCapture,
            ArnStatus::SubmittedToPersonalization,
        )),
        ReminderType::PendingPersonalization => Some((
            ArnStatus::SubmittedToPersonalization,
            ArnStatus::PendingDelivery,
        )),
        ReminderType::StateDeliveryThreshold => None,
    }
}

/// 解决提醒；ARN 仍处于提醒对应状态时推进一步，已前进的 ARN 不动
pub async fn resolve(
    pool: &SqlitePool,
    reminder_id: i64,
    actor: &Actor,
) -> AppResult<Outcome<ResolveOutcome>> {
    actor.require("resolve reminder", FIELD_STAFF)?;
    let reminder = repository::reminder::find_by_id(pool, reminder_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ReminderNotFound,
                format!("Reminder {reminder_id} not found"),
            )
            .with_detail("reminder_id", reminder_id)
        })?;

    if reminder.resolved_at.is_some() {
        return Ok(Outcome::pure(ResolveOutcome {
            success: true,
            reminder,
            advanced_to: None,
        }));
    }

    let mut effects = Effects::new();
    let mut advanced_to = None;
    if let (Some((expected, target)), Some(arn)) =
        (advancement(reminder.reminder_type), reminder.arn.as_deref())
        && let Some(current) = repository::arn::find_by_arn(pool, arn).await?
        && current.status == expected
    {
        match advance(pool, arn, target, &actor.name).await {
            Ok(outcome) => {
                advanced_to = Some(outcome.value.status);
                effects.merge(outcome.effects);
            }
            Err(e) if e.code == ErrorCode::InvalidTransition => {
                tracing::debug!(arn = %arn, "ARN moved on before reminder resolution");
            }
            Err(e) => return Err(e),
        }
    }

    repository::reminder::resolve(pool, reminder_id, now_millis()).await?;
    let resolved = repository::reminder::find_by_id(pool, reminder_id)
        .await?
        .unwrap_or(reminder);

    tracing::info!(reminder_id, advanced_to = ?advanced_to, operator = %actor.name, "Reminder resolved");
    let mut record = match resolved.arn.as_deref() {
        Some(arn) => AuditRecord::for_arn(AuditAction::ReminderResolved, arn, &actor.name),
        None => AuditRecord::new(AuditAction::ReminderResolved, &actor.name),
    };
    record = record.new_value(resolved.reminder_type.as_str());
    effects.push_audit(record);

    Ok(Outcome::new(
        ResolveOutcome {
            success: true,
            reminder: resolved,
            advanced_to,
        },
        effects,
    ))
}

pub async fn list_unresolved(pool: &SqlitePool) -> AppResult<Vec<ReminderView>> {
    Ok(repository::reminder::list_unresolved(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_file_pool, test_pool};
    use crate::test_support::{officer, operator, seed_arn, seed_state, supervisor};

    async fn seeded_pool() -> SqlitePool {
        let pool = test_pool().await;
        seed_state(&pool, "Lagos").await;
        seed_state(&pool, "Kano").await;
        seed_arn(&pool, "A-1", "Lagos", ArnStatus::AwaitingCapture).await;
        seed_arn(&pool, "A-2", "Lagos", ArnStatus::SubmittedToPersonalization).await;
        for arn in ["P-1", "P-2", "P-3"] {
            seed_arn(&pool, arn, "Lagos", ArnStatus::PendingDelivery).await;
        }
        seed_arn(&pool, "K-1", "Kano", ArnStatus::PendingDelivery).await;
        pool
    }

    #[tokio::test]
    async fn test_generate_creates_expected_reminders() {
        let pool = seeded_pool().await;
        let summary = generate(&pool, 3).await.unwrap();
        assert_eq!(
            summary,
            GenerateSummary {
                pending_capture: 1,
                pending_personalization: 1,
                state_delivery_threshold: 1,
            }
        );

        let reminders = list_unresolved(&pool).await.unwrap();
        assert_eq!(reminders.len(), 3);
        let capture = reminders
            .iter()
            .find(|r| r.reminder.reminder_type == ReminderType::PendingCapture)
            .unwrap();
        assert_eq!(
            capture.reminder.message,
            "ARN A-1 is still awaiting capture and personalization submission"
        );
        assert_eq!(capture.arn_status, Some(ArnStatus::AwaitingCapture));

        let state = reminders
            .iter()
            .find(|r| r.reminder.reminder_type == ReminderType::StateDeliveryThreshold)
            .unwrap();
        assert_eq!(state.reminder.state.as_deref(), Some("Lagos"));
        assert!(state.reminder.arn.is_none());
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let pool = seeded_pool().await;
        let first = generate(&pool, 3).await.unwrap();
        let second = generate(&pool, 3).await.unwrap();
        assert_eq!(first.created(), 3);
        assert_eq!(second.created(), 0);
        assert_eq!(list_unresolved(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_generation_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_file_pool(dir.path()).await;
        seed_state(&pool, "Lagos").await;
        for i in 0..20 {
            seed_arn(&pool, &format!("A-{i}"), "Lagos", ArnStatus::AwaitingCapture).await;
        }

        let (a, b, c) = tokio::join!(generate(&pool, 3), generate(&pool, 3), generate(&pool, 3));
        let created: u64 = [a, b, c]
            .into_iter()
            .filter_map(Result::ok)
            .map(|s| s.pending_capture)
            .sum();
        assert!(created <= 20);
        let open = repository::reminder::count_unresolved(&pool, ReminderType::PendingCapture)
            .await
            .unwrap();
        assert_eq!(open, 20);
    }

    #[tokio::test]
    async fn test_resolve_advances_arn() {
        let pool = seeded_pool().await;
        generate(&pool, 3).await.unwrap();
        let officer = officer(&pool, "officer1").await;

        let reminders = list_unresolved(&pool).await.unwrap();
        let capture = reminders
            .iter()
            .find(|r| r.reminder.arn.as_deref() == Some("A-1"))
            .unwrap();

        let outcome = resolve(&pool, capture.reminder.id, &officer).await.unwrap();
        assert!(outcome.value.success);
        assert!(outcome.value.reminder.resolved_at.is_some());
        assert_eq!(
            outcome.value.advanced_to,
            Some(ArnStatus::SubmittedToPersonalization)
        );
        assert!(outcome.effects.regenerate_reminders);

        let arn = repository::arn::find_by_arn(&pool, "A-1").await.unwrap().unwrap();
        assert_eq!(arn.status, ArnStatus::SubmittedToPersonalization);

        // 再次解决为无操作
        let again = resolve(&pool, capture.reminder.id, &officer).await.unwrap();
        assert!(again.value.advanced_to.is_none());
        assert!(again.effects.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_leaves_moved_arn_untouched() {
        let pool = seeded_pool().await;
        generate(&pool, 3).await.unwrap();
        let reminder = list_unresolved(&pool)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.reminder.arn.as_deref() == Some("A-2"))
            .unwrap();

        sqlx::query("UPDATE arns SET status = 'Delivered' WHERE arn = 'A-2'")
            .execute(&pool)
            .await
            .unwrap();

        let outcome = resolve(&pool, reminder.reminder.id, &operator()).await.unwrap();
        assert!(outcome.value.advanced_to.is_none());
        assert!(outcome.value.reminder.resolved_at.is_some());
        let arn = repository::arn::find_by_arn(&pool, "A-2").await.unwrap().unwrap();
        assert_eq!(arn.status, ArnStatus::Delivered);
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let pool = seeded_pool().await;
        let err = resolve(&pool, 999, &operator()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReminderNotFound);

        generate(&pool, 3).await.unwrap();
        let id = list_unresolved(&pool).await.unwrap()[0].reminder.id;
        let err = resolve(&pool, id, &supervisor()).await.unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_resolved_reminder_is_recreated_while_condition_holds() {
        let pool = seeded_pool().await;
        generate(&pool, 3).await.unwrap();
        let state_reminder = list_unresolved(&pool)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.reminder.reminder_type == ReminderType::StateDeliveryThreshold)
            .unwrap();
        resolve(&pool, state_reminder.reminder.id, &operator()).await.unwrap();

        let summary = generate(&pool, 3).await.unwrap();
        assert_eq!(summary.state_delivery_threshold, 1);
    }
}
