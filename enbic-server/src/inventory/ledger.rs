//! 台账写入与余额查询

use shared::models::{
    AdjustmentKind, BalanceView, IssueToPersonalization, LedgerQuery, LowStock, MovementType,
    StockAdjust, StockMovement, StockReceive,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use super::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::{ADMIN, FIELD_STAFF};
use crate::db::repository::{self, movement::NewMovement, setting};
use crate::db::{begin, commit};
use crate::effects::{Effects, Outcome};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, optional_trimmed, validate_positive_qty,
};

const DEFAULT_LEDGER_LIMIT: i64 = 100;
const MAX_LEDGER_LIMIT: i64 = 1000;

fn partition_label(partition: Option<i64>) -> String {
    match partition {
        Some(id) => format!("officer {id}"),
        None => "central".to_string(),
    }
}

/// 入库 (`received`)，记入操作人的分区
pub async fn receive(
    pool: &SqlitePool,
    input: StockReceive,
    actor: &Actor,
) -> AppResult<Outcome<StockMovement>> {
    actor.require("receive stock", FIELD_STAFF)?;
    validate_positive_qty(input.qty, "qty")?;
    let reference = optional_trimmed(input.reference.as_deref(), "reference", MAX_NOTE_LEN)?;
    let notes = optional_trimmed(input.notes.as_deref(), "notes", MAX_NOTE_LEN)?;

    let movement = repository::movement::insert(
        pool,
        NewMovement {
            movement_type: MovementType::Received,
            qty: input.qty,
            reference: reference.as_deref(),
            related_request_id: None,
            operator: &actor.name,
            user_id: actor.partition(),
            notes: notes.as_deref(),
            created_at: now_millis(),
        },
    )
    .await?;

    tracing::info!(qty = movement.qty, partition = %partition_label(movement.user_id), operator = %actor.name, "Stock received");
    let record = AuditRecord::new(AuditAction::StockReceived, &actor.name).new_value(format!(
        "+{} ({})",
        movement.qty,
        partition_label(movement.user_id)
    ));
    Ok(Outcome::new(movement, Effects::new().audit(record)))
}

/// 发往个人化 (`issued -qty`)。先插入流水再校验扣减前余额，不足则回滚。
pub async fn issue_to_personalization(
    pool: &SqlitePool,
    input: IssueToPersonalization,
    actor: &Actor,
) -> AppResult<Outcome<StockMovement>> {
    actor.require("issue stock to personalization", FIELD_STAFF)?;
    validate_positive_qty(input.qty, "qty")?;
    let issued_to = optional_trimmed(input.issued_to.as_deref(), "issued_to", MAX_NAME_LEN)?;
    let reference = optional_trimmed(input.reference.as_deref(), "reference", MAX_NOTE_LEN)?;
    let notes = issued_to.map(|to| format!("Issued to: {to}"));
    let partition = actor.partition();

    let mut tx = begin(pool).await?;
    let movement = repository::movement::insert(
        &mut *tx,
        NewMovement {
            movement_type: MovementType::Issued,
            qty: -input.qty,
            reference: reference.as_deref(),
            related_request_id: None,
            operator: &actor.name,
            user_id: partition,
            notes: notes.as_deref(),
            created_at: now_millis(),
        },
    )
    .await?;
    let available = repository::movement::balance_before(&mut *tx, partition, movement.id).await?;
    if available < input.qty {
        drop(tx);
        tracing::warn!(available, requested = input.qty, partition = %partition_label(partition), "Issue rejected: insufficient stock");
        return Err(AppError::insufficient_stock(available, input.qty));
    }
    commit(tx).await?;

    tracing::info!(qty = input.qty, partition = %partition_label(partition), operator = %actor.name, "Stock issued to personalization");
    let record = AuditRecord::new(AuditAction::StockIssued, &actor.name)
        .old(available.to_string())
        .new_value((available - input.qty).to_string());
    Ok(Outcome::new(movement, Effects::new().audit(record)))
}

/// 调整。`damaged` / `lost` 总是减少，正数会被取反。
pub async fn adjust(
    pool: &SqlitePool,
    input: StockAdjust,
    actor: &Actor,
) -> AppResult<Outcome<StockMovement>> {
    actor.require("adjust stock", FIELD_STAFF)?;
    if input.qty == 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            "qty must not be 0",
        )
        .with_detail("field", "qty"));
    }
    let reference = optional_trimmed(input.reference.as_deref(), "reference", MAX_NOTE_LEN)?;
    let notes = optional_trimmed(input.notes.as_deref(), "notes", MAX_NOTE_LEN)?;
    let qty = match input.kind {
        AdjustmentKind::Damaged | AdjustmentKind::Lost => -input.qty.abs(),
        AdjustmentKind::Adjustment => input.qty,
    };

    let movement = repository::movement::insert(
        pool,
        NewMovement {
            movement_type: input.kind.into(),
            qty,
            reference: reference.as_deref(),
            related_request_id: None,
            operator: &actor.name,
            user_id: actor.partition(),
            notes: notes.as_deref(),
            created_at: now_millis(),
        },
    )
    .await?;

    tracing::info!(kind = %movement.movement_type, qty, operator = %actor.name, "Stock adjusted");
    let record = AuditRecord::new(AuditAction::StockAdjusted, &actor.name)
        .new_value(format!("{} {:+}", movement.movement_type, qty));
    Ok(Outcome::new(movement, Effects::new().audit(record)))
}

/// 流水列表；officer 只看自己的分区
pub async fn ledger(
    pool: &SqlitePool,
    query: &LedgerQuery,
    actor: &Actor,
) -> AppResult<Vec<StockMovement>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEDGER_LIMIT)
        .clamp(1, MAX_LEDGER_LIMIT);
    let scope = actor.partition().map(Some);
    Ok(repository::movement::list(pool, scope, limit).await?)
}

pub async fn balances(pool: &SqlitePool, actor: &Actor) -> AppResult<BalanceView> {
    match actor.partition() {
        Some(own) => Ok(BalanceView::Own {
            total: repository::movement::balance(pool, Some(own)).await?,
        }),
        None => Ok(BalanceView::Overview {
            central_stock: repository::movement::balance(pool, None).await?,
            officer_stocks: repository::movement::officer_balances(pool).await?,
        }),
    }
}

async fn threshold(pool: &SqlitePool) -> AppResult<i64> {
    let value = setting::get(pool, setting::LOW_STOCK_THRESHOLD).await?;
    Ok(match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "Invalid low stock threshold setting, using default");
            DEFAULT_LOW_STOCK_THRESHOLD
        }),
        None => DEFAULT_LOW_STOCK_THRESHOLD,
    })
}

/// 中央库低库存检查
pub async fn low_stock_check(pool: &SqlitePool) -> AppResult<LowStock> {
    let total = repository::movement::balance(pool, None).await?;
    let threshold = threshold(pool).await?;
    Ok(LowStock {
        total,
        threshold,
        low: total < threshold,
    })
}

pub async fn set_low_stock_threshold(
    pool: &SqlitePool,
    value: i64,
    actor: &Actor,
) -> AppResult<Outcome<LowStock>> {
    actor.require("set low stock threshold", ADMIN)?;
    if value < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "threshold must not be negative",
        )
        .with_detail("field", "threshold"));
    }
    let previous = threshold(pool).await?;
    setting::set(pool, setting::LOW_STOCK_THRESHOLD, &value.to_string(), now_millis()).await?;

    tracing::info!(previous, threshold = value, operator = %actor.name, "Low stock threshold updated");
    let record = AuditRecord::new(AuditAction::ThresholdUpdated, &actor.name)
        .old(previous.to_string())
        .new_value(value.to_string());
    Ok(Outcome::new(low_stock_check(pool).await?, Effects::new().audit(record)))
}
