//! ARN 生命周期操作
//!
//! 所有写操作先做校验与权限检查，再执行带状态条件的更新；
//! 并发下输掉竞争的一方得到 `InvalidTransition`。

use shared::models::{
    Arn, ArnCreate, ArnCreated, ArnItemResult, ArnQuery, ArnStatus, BulkArnResponse,
    DeliveryConfirmResponse, DeliveryStat, PickupRequest, StoreReceiptRequest,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;
use std::collections::HashSet;

use super::{arn_not_found, graph, state_not_found};
use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::{FIELD_STAFF, OPERATOR};
use crate::db::repository::{self, RepoError};
use crate::db::{begin, commit};
use crate::effects::{Effects, Outcome};
use crate::utils::validation::{
    MAX_ARN_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, optional_trimmed,
    required_trimmed,
};

/// 创建 ARN (初始状态 Awaiting Capture)
pub async fn create(
    pool: &SqlitePool,
    input: ArnCreate,
    actor: &Actor,
) -> AppResult<Outcome<ArnCreated>> {
    actor.require("create ARN", OPERATOR)?;
    let arn = required_trimmed(&input.arn, "arn", MAX_ARN_LEN)?;
    let state = required_trimmed(&input.state, "state", MAX_NAME_LEN)?;
    let name = optional_trimmed(input.name.as_deref(), "name", MAX_NAME_LEN)?;

    if !repository::jurisdiction::exists(pool, &state).await? {
        return Err(state_not_found(&state));
    }

    let created = repository::arn::insert(pool, &arn, &state, name.as_deref(), now_millis())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::ArnAlreadyExists,
                format!("ARN {arn} already exists"),
            )
            .with_detail("arn", arn.clone()),
            other => other.into(),
        })?;

    tracing::info!(arn = %created.arn, state = %created.state, operator = %actor.name, "ARN created");

    let effects = Effects::new()
        .audit(
            AuditRecord::for_arn(AuditAction::ArnCreated, &created.arn, &actor.name)
                .new_value(format!("State: {}", created.state)),
        )
        .regenerate_reminders();

    Ok(Outcome::new(
        ArnCreated {
            id: created.id,
            arn: created.arn,
            state: created.state,
            status: created.status,
        },
        effects,
    ))
}

/// 单步状态转换
pub async fn transition(
    pool: &SqlitePool,
    arn: &str,
    to: ArnStatus,
    actor: &Actor,
) -> AppResult<Outcome<Arn>> {
    actor.require("update ARN status", OPERATOR)?;
    advance(pool, arn.trim(), to, &actor.name).await
}

/// 不做角色检查的转换，供提醒解决等内部流程复用
pub(crate) async fn advance(
    pool: &SqlitePool,
    arn: &str,
    to: ArnStatus,
    operator: &str,
) -> AppResult<Outcome<Arn>> {
    let current = repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))?;
    let from = current.status;

    if !graph::can_transition(from, to) {
        return Err(AppError::invalid_transition(from.as_str(), to.as_str()).with_detail("arn", arn));
    }

    if !repository::arn::transition(pool, arn, from, to, now_millis()).await? {
        // 并发转换已抢先
        let latest = repository::arn::find_by_arn(pool, arn)
            .await?
            .map(|a| a.status)
            .unwrap_or(from);
        return Err(AppError::invalid_transition(latest.as_str(), to.as_str()).with_detail("arn", arn));
    }

    let updated = repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))?;

    tracing::info!(arn = %arn, from = %from, to = %to, operator = %operator, "ARN status updated");

    let effects = Effects::new()
        .audit(
            AuditRecord::for_arn(AuditAction::StatusUpdated, arn, operator)
                .old(from.as_str())
                .new_value(to.as_str()),
        )
        .regenerate_reminders();
    Ok(Outcome::new(updated, effects))
}

/// 记录证件号 (仅 Submitted to Personalization / Pending Delivery)
pub async fn set_document_number(
    pool: &SqlitePool,
    arn: &str,
    document_number: &str,
    actor: &Actor,
) -> AppResult<Outcome<Arn>> {
    actor.require("set document number", OPERATOR)?;
    let arn = arn.trim();
    let document_number = required_trimmed(document_number, "document_number", MAX_SHORT_TEXT_LEN)?;

    let current = repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))?;

    let invalid_state = |status: ArnStatus| {
        AppError::with_message(
            ErrorCode::InvalidArnState,
            format!("Document number can only be set while Submitted to Personalization or Pending Delivery (current: {status})"),
        )
        .with_detail("arn", arn)
        .with_detail("status", status.as_str())
    };

    if !matches!(
        current.status,
        ArnStatus::SubmittedToPersonalization | ArnStatus::PendingDelivery
    ) {
        return Err(invalid_state(current.status));
    }

    if !repository::arn::set_document_number(pool, arn, &document_number, &actor.name, now_millis())
        .await?
    {
        let latest = repository::arn::find_by_arn(pool, arn)
            .await?
            .ok_or_else(|| arn_not_found(arn))?;
        return Err(invalid_state(latest.status));
    }

    let updated = repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))?;

    let mut record = AuditRecord::for_arn(AuditAction::DocumentNumberSet, arn, &actor.name)
        .new_value(document_number);
    if let Some(previous) = current.document_number {
        record = record.old(previous);
    }
    Ok(Outcome::new(updated, Effects::new().audit(record)))
}

/// 某辖区全部 Pending Delivery 的 ARN 批量送达 (单事务)
pub async fn confirm_delivery_for_state(
    pool: &SqlitePool,
    state: &str,
    notes: Option<&str>,
    actor: &Actor,
) -> AppResult<Outcome<DeliveryConfirmResponse>> {
    actor.require("confirm delivery", OPERATOR)?;
    let state = required_trimmed(state, "state", MAX_NAME_LEN)?;
    let notes = optional_trimmed(notes, "notes", MAX_NOTE_LEN)?;

    if !repository::jurisdiction::exists(pool, &state).await? {
        return Err(state_not_found(&state));
    }

    let now = now_millis();
    let mut tx = begin(pool).await?;
    let delivered = repository::arn::deliver_all_pending_in_state(&mut *tx, &state, now).await?;
    if !delivered.is_empty() {
        repository::delivery::insert(
            &mut *tx,
            &state,
            delivered.len() as i64,
            notes.as_deref(),
            None,
            now,
        )
        .await?;
    }
    commit(tx).await?;

    let count = delivered.len() as i64;
    if count == 0 {
        return Ok(Outcome::pure(DeliveryConfirmResponse {
            success: true,
            count: 0,
            message: Some(format!("No pending deliveries for {state}")),
        }));
    }

    tracing::info!(state = %state, count, operator = %actor.name, "Bulk delivery confirmed");

    let mut effects = Effects::new().regenerate_reminders();
    for arn in &delivered {
        effects.push_audit(
            AuditRecord::for_arn(AuditAction::BulkDelivered, arn, &actor.name)
                .old(ArnStatus::PendingDelivery.as_str())
                .new_value(format!("Delivered (State: {state})")),
        );
    }

    Ok(Outcome::new(
        DeliveryConfirmResponse {
            success: true,
            count,
            message: None,
        },
        effects,
    ))
}

/// 请求中的 ARN 去空白、去重；重复项直接记为失败
fn prepare_items(arns: &[String], results: &mut Vec<ArnItemResult>) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for raw in arns {
        let arn = raw.trim().to_string();
        let index = results.len();
        if arn.is_empty() {
            results.push(ArnItemResult::failed(raw.clone(), "ARN must not be empty"));
        } else if !seen.insert(arn.clone()) {
            results.push(ArnItemResult::failed(arn, "Duplicate ARN in request"));
        } else {
            // 占位，处理后替换
            results.push(ArnItemResult::failed(arn.clone(), "Not processed"));
            items.push((index, arn));
        }
    }
    items
}

fn require_items(arns: &[String]) -> AppResult<()> {
    if arns.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "At least one ARN is required",
        )
        .with_detail("field", "arns"));
    }
    Ok(())
}

/// 入库: Submitted to Personalization / Stored → Pending Delivery
pub async fn receive_into_store(
    pool: &SqlitePool,
    request: StoreReceiptRequest,
    actor: &Actor,
) -> AppResult<Outcome<BulkArnResponse>> {
    actor.require("receive cards into store", FIELD_STAFF)?;
    require_items(&request.arns)?;
    let state = optional_trimmed(request.state.as_deref(), "state", MAX_NAME_LEN)?;

    let mut results = Vec::with_capacity(request.arns.len());
    let items = prepare_items(&request.arns, &mut results);
    let mut effects = Effects::new();

    for (index, arn) in items {
        results[index] = match receive_one(pool, &arn, state.as_deref()).await {
            Ok(from) => {
                effects.push_audit(
                    AuditRecord::for_arn(AuditAction::StoreReceived, &arn, &actor.name)
                        .old(from.as_str())
                        .new_value(ArnStatus::PendingDelivery.as_str()),
                );
                ArnItemResult::ok(arn, ArnStatus::PendingDelivery)
            }
            Err(e) => ArnItemResult::failed(arn, e.message),
        };
    }

    let response = BulkArnResponse { results };
    if response.succeeded() > 0 {
        effects = effects.regenerate_reminders();
        tracing::info!(received = response.succeeded(), operator = %actor.name, "Cards received into store");
    }
    Ok(Outcome::new(response, effects))
}

async fn receive_one(pool: &SqlitePool, arn: &str, state: Option<&str>) -> AppResult<ArnStatus> {
    let current = repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))?;
    if let Some(state) = state
        && current.state != state
    {
        return Err(AppError::validation(format!(
            "ARN {arn} belongs to {}, not {state}",
            current.state
        )));
    }
    if !graph::can_transition(current.status, ArnStatus::PendingDelivery) {
        return Err(AppError::invalid_transition(
            current.status.as_str(),
            ArnStatus::PendingDelivery.as_str(),
        ));
    }
    if !repository::arn::receive_into_store(pool, arn, now_millis()).await? {
        return Err(AppError::invalid_transition(
            current.status.as_str(),
            ArnStatus::PendingDelivery.as_str(),
        ));
    }
    Ok(current.status)
}

/// SHQ 自提: Pending Delivery → Collected at SHQ
pub async fn pickup_at_shq(
    pool: &SqlitePool,
    request: PickupRequest,
    actor: &Actor,
) -> AppResult<Outcome<BulkArnResponse>> {
    actor.require("record SHQ pickup", FIELD_STAFF)?;
    let collector_name =
        optional_trimmed(request.collector_name.as_deref(), "collector_name", MAX_NAME_LEN)?;
    let collector_id =
        optional_trimmed(request.collector_id.as_deref(), "collector_id", MAX_SHORT_TEXT_LEN)?;
    let phone = optional_trimmed(request.phone.as_deref(), "phone", MAX_SHORT_TEXT_LEN)?;
    if collector_name.is_none() && collector_id.is_none() && phone.is_none() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "At least one collector detail (name, id or phone) is required",
        )
        .with_detail("field", "collector"));
    }
    require_items(&request.arns)?;

    let mut results = Vec::with_capacity(request.arns.len());
    let items = prepare_items(&request.arns, &mut results);
    let mut effects = Effects::new();
    let collector_label = collector_name
        .as_deref()
        .or(collector_id.as_deref())
        .or(phone.as_deref())
        .unwrap_or_default()
        .to_string();

    for (index, arn) in items {
        let outcome = async {
            let current = repository::arn::find_by_arn(pool, &arn)
                .await?
                .ok_or_else(|| arn_not_found(&arn))?;
            let collected = current.status == ArnStatus::PendingDelivery
                && repository::arn::collect_at_shq(
                    pool,
                    &arn,
                    collector_name.as_deref(),
                    collector_id.as_deref(),
                    phone.as_deref(),
                    now_millis(),
                )
                .await?;
            if !collected {
                return Err(AppError::invalid_transition(
                    current.status.as_str(),
                    ArnStatus::CollectedAtShq.as_str(),
                ));
            }
            Ok::<_, AppError>(())
        }
        .await;

        results[index] = match outcome {
            Ok(()) => {
                effects.push_audit(
                    AuditRecord::for_arn(AuditAction::ShqCollected, &arn, &actor.name)
                        .old(ArnStatus::PendingDelivery.as_str())
                        .new_value(format!(
                            "{} (Collector: {})",
                            ArnStatus::CollectedAtShq,
                            collector_label
                        )),
                );
                ArnItemResult::ok(arn, ArnStatus::CollectedAtShq)
            }
            Err(e) => ArnItemResult::failed(arn, e.message),
        };
    }

    let response = BulkArnResponse { results };
    if response.succeeded() > 0 {
        effects = effects.regenerate_reminders();
        tracing::info!(collected = response.succeeded(), operator = %actor.name, "Cards collected at SHQ");
    }
    Ok(Outcome::new(response, effects))
}

pub async fn list(pool: &SqlitePool, filter: &ArnQuery) -> AppResult<Vec<Arn>> {
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        status
            .parse::<ArnStatus>()
            .map_err(AppError::invalid_request)?;
    }
    Ok(repository::arn::list(pool, filter).await?)
}

pub async fn get(pool: &SqlitePool, arn: &str) -> AppResult<Arn> {
    let arn = arn.trim();
    repository::arn::find_by_arn(pool, arn)
        .await?
        .ok_or_else(|| arn_not_found(arn))
}

pub async fn delivery_stats(pool: &SqlitePool) -> AppResult<Vec<DeliveryStat>> {
    Ok(repository::arn::delivery_stats(pool).await?)
}
