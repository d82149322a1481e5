//! 领卡申请、审批调拨与发放单

use shared::models::{
    BlankCardRequest, BlankCardRequestCreate, BlankCardRequestView, DecisionAction, IssueNote,
    IssueNoteStatus, IssueSignRequest, IssueSigner, MovementType, RequestDecision, RequestStatus,
    Role,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::artifacts::{ArtifactKind, ArtifactStore, StoredFile};
use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::{OFFICER, OPERATOR};
use crate::db::repository::{self, RepoError, movement::NewMovement};
use crate::db::{begin, commit};
use crate::effects::{Effects, Outcome};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, optional_trimmed, required_trimmed,
    validate_positive_qty,
};

fn request_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::RequestNotFound,
        format!("Blank card request {id} not found"),
    )
    .with_detail("request_id", id)
}

fn issue_note_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::IssueNoteNotFound, format!("Issue note {id} not found"))
        .with_detail("issue_note_id", id)
}

async fn load_request(pool: &SqlitePool, id: i64) -> AppResult<BlankCardRequest> {
    repository::request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| request_not_found(id))
}

async fn load_note(pool: &SqlitePool, id: i64) -> AppResult<IssueNote> {
    repository::issue_note::find_by_id(pool, id)
        .await?
        .ok_or_else(|| issue_note_not_found(id))
}

/// officer 发起领卡申请
pub async fn create_request(
    pool: &SqlitePool,
    input: BlankCardRequestCreate,
    actor: &Actor,
) -> AppResult<Outcome<BlankCardRequest>> {
    actor.require("request blank cards", OFFICER)?;
    // 库存按申请人分区记账，admin 属于中央库
    if actor.role != Role::Officer {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Role {} is not permitted to request blank cards", actor.role),
        )
        .with_detail("operation", "request blank cards")
        .with_detail("required", vec![Role::Officer.as_str()]));
    }
    validate_positive_qty(input.quantity, "quantity")?;
    let reason = optional_trimmed(input.reason.as_deref(), "reason", MAX_NOTE_LEN)?;
    let needed_by = optional_trimmed(input.needed_by.as_deref(), "needed_by", MAX_SHORT_TEXT_LEN)?;

    let request = repository::request::insert(
        pool,
        actor.id,
        input.quantity,
        reason.as_deref(),
        needed_by.as_deref(),
        now_millis(),
    )
    .await?;

    tracing::info!(request_id = request.id, quantity = request.quantity, requester = %actor.name, "Blank card request created");
    let record = AuditRecord::new(AuditAction::RequestCreated, &actor.name)
        .new_value(format!("Request {} for {} cards", request.id, request.quantity));
    Ok(Outcome::new(request, Effects::new().audit(record)))
}

/// 审批。批准数量 > 0 时在同一事务中完成中央库 → 申请人分区的调拨。
pub async fn decide(
    pool: &SqlitePool,
    request_id: i64,
    decision: RequestDecision,
    actor: &Actor,
) -> AppResult<Outcome<BlankCardRequest>> {
    actor.require("decide blank card request", OPERATOR)?;
    let note = optional_trimmed(decision.decision_note.as_deref(), "decision_note", MAX_NOTE_LEN)?;
    let request = load_request(pool, request_id).await?;

    let already_decided = |status: RequestStatus| {
        AppError::with_message(
            ErrorCode::RequestAlreadyDecided,
            format!("Request {request_id} is already {}", status.as_str()),
        )
        .with_detail("status", status.as_str())
    };
    if request.status != RequestStatus::Pending {
        return Err(already_decided(request.status));
    }

    let (status, approved_qty) = match decision.action {
        DecisionAction::Reject => (RequestStatus::Rejected, 0),
        DecisionAction::Approve => (RequestStatus::Approved, request.quantity),
        DecisionAction::Partial => {
            let qty = decision.approved_qty.ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RequiredField,
                    "approved_qty is required for a partial approval",
                )
                .with_detail("field", "approved_qty")
            })?;
            if qty <= 0 || qty > request.quantity {
                return Err(AppError::with_message(
                    ErrorCode::InvalidQuantity,
                    format!("approved_qty must be between 1 and {}", request.quantity),
                )
                .with_detail("field", "approved_qty")
                .with_detail("value", qty));
            }
            (RequestStatus::PartiallyApproved, qty)
        }
    };

    let now = now_millis();
    let mut tx = begin(pool).await?;
    let decided = repository::request::decide(
        &mut *tx,
        request_id,
        status,
        approved_qty,
        actor.id,
        note.as_deref(),
        now,
    )
    .await?;
    if !decided {
        drop(tx);
        let latest = load_request(pool, request_id).await?;
        return Err(already_decided(latest.status));
    }

    if approved_qty > 0 {
        let reference = format!("REQ-{request_id}");
        let issued = repository::movement::insert(
            &mut *tx,
            NewMovement {
                movement_type: MovementType::Issued,
                qty: -approved_qty,
                reference: Some(&reference),
                related_request_id: Some(request_id),
                operator: &actor.name,
                user_id: None,
                notes: Some("Transfer to officer store"),
                created_at: now,
            },
        )
        .await?;
        let available = repository::movement::balance_before(&mut *tx, None, issued.id).await?;
        if available < approved_qty {
            drop(tx);
            return Err(AppError::insufficient_stock(available, approved_qty)
                .with_detail("request_id", request_id));
        }
        repository::movement::insert(
            &mut *tx,
            NewMovement {
                movement_type: MovementType::Received,
                qty: approved_qty,
                reference: Some(&reference),
                related_request_id: Some(request_id),
                operator: &actor.name,
                user_id: Some(request.requester_id),
                notes: Some("Transfer from central store"),
                created_at: now,
            },
        )
        .await?;
    }
    commit(tx).await?;

    let updated = load_request(pool, request_id).await?;
    tracing::info!(
        request_id,
        status = status.as_str(),
        approved_qty,
        operator = %actor.name,
        "Blank card request decided"
    );
    let record = AuditRecord::new(AuditAction::RequestDecided, &actor.name)
        .old(RequestStatus::Pending.as_str())
        .new_value(format!(
            "Request {request_id}: {} ({approved_qty})",
            status.as_str()
        ));
    Ok(Outcome::new(updated, Effects::new().audit(record)))
}

/// 为已批准的申请生成发放单
pub async fn generate_issue_note(
    pool: &SqlitePool,
    request_id: i64,
    actor: &Actor,
) -> AppResult<Outcome<IssueNote>> {
    actor.require("generate issue note", OPERATOR)?;
    let request = load_request(pool, request_id).await?;
    let approved = matches!(
        request.status,
        RequestStatus::Approved | RequestStatus::PartiallyApproved
    );
    if !approved || request.approved_qty <= 0 {
        return Err(AppError::with_message(
            ErrorCode::RequestNotApproved,
            format!(
                "Request {request_id} is {} and cannot be issued",
                request.status.as_str()
            ),
        )
        .with_detail("status", request.status.as_str()));
    }

    // 每个申请至多一张发放单
    let note = repository::issue_note::insert(pool, request_id, request.approved_qty, now_millis())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Request {request_id} already has an issue note"),
            )
            .with_detail("request_id", request_id),
            other => other.into(),
        })?;
    tracing::info!(issue_note_id = note.id, request_id, quantity = note.quantity, "Issue note generated");
    let record = AuditRecord::new(AuditAction::IssueNoteGenerated, &actor.name).new_value(format!(
        "Issue note {} for request {request_id} ({} cards)",
        note.id, note.quantity
    ));
    Ok(Outcome::new(note, Effects::new().audit(record)))
}

/// 发放单签字；双方齐全时完成并记入申请人分区 (`received_from_issue`)
pub async fn sign_issue_note(
    pool: &SqlitePool,
    store: &ArtifactStore,
    issue_id: i64,
    input: IssueSignRequest,
    actor: &Actor,
) -> AppResult<Outcome<IssueNote>> {
    match input.signer {
        IssueSigner::Issuer => actor.require("sign issue note as issuer", OPERATOR)?,
        IssueSigner::Receiver => actor.require("sign issue note as receiver", OFFICER)?,
    }
    let name = required_trimmed(&input.name, "name", MAX_NAME_LEN)?;
    let note = load_note(pool, issue_id).await?;

    let completed = || {
        AppError::with_message(
            ErrorCode::IssueNoteCompleted,
            format!("Issue note {issue_id} is already completed"),
        )
        .with_detail("issue_note_id", issue_id)
    };
    if note.status == IssueNoteStatus::Completed {
        return Err(completed());
    }
    let request = load_request(pool, note.request_id).await?;

    let file = match input.file_data.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(data) => Some(store.prepare_data_url(
            ArtifactKind::IssueNote,
            &format!("issue-{issue_id}"),
            data,
        )?),
        None => None,
    };

    let signer_label = match input.signer {
        IssueSigner::Issuer => "issuer",
        IssueSigner::Receiver => "receiver",
    };

    let now = now_millis();
    let mut tx = begin(pool).await?;
    if !repository::issue_note::record_signature(
        &mut *tx,
        issue_id,
        input.signer,
        &name,
        file.as_ref().map(|f| f.path()),
        now,
    )
    .await?
    {
        drop(tx);
        return Err(completed());
    }
    let finished = repository::issue_note::complete(&mut *tx, issue_id, now).await?;
    if finished {
        repository::movement::insert(
            &mut *tx,
            NewMovement {
                movement_type: MovementType::ReceivedFromIssue,
                qty: note.quantity,
                reference: Some(&format!("ISSUE-{issue_id}")),
                related_request_id: Some(request.id),
                operator: &actor.name,
                user_id: Some(request.requester_id),
                notes: None,
                created_at: now,
            },
        )
        .await?;
    }
    if let Some(file) = &file {
        store.write(file).await?;
    }
    commit(tx).await?;

    let updated = load_note(pool, issue_id).await?;
    tracing::info!(issue_note_id = issue_id, signer = signer_label, completed = finished, "Issue note signed");

    let mut effects = Effects::new().audit(
        AuditRecord::new(AuditAction::IssueNoteSigned, &actor.name)
            .new_value(format!("Issue note {issue_id} {signer_label}: {name}")),
    );
    if finished {
        effects.push_audit(
            AuditRecord::new(AuditAction::IssueNoteCompleted, &actor.name).new_value(format!(
                "Issue note {issue_id}: +{} to user {}",
                note.quantity, request.requester_id
            )),
        );
    }
    Ok(Outcome::new(updated, effects))
}

/// officer 只看自己的申请
pub async fn list_requests(
    pool: &SqlitePool,
    actor: &Actor,
) -> AppResult<Vec<BlankCardRequestView>> {
    Ok(repository::request::list(pool, actor.partition()).await?)
}

pub async fn list_issue_notes(pool: &SqlitePool) -> AppResult<Vec<IssueNote>> {
    Ok(repository::issue_note::list(pool).await?)
}

pub async fn read_issue_note_file(
    pool: &SqlitePool,
    store: &ArtifactStore,
    issue_id: i64,
) -> AppResult<StoredFile> {
    let note = load_note(pool, issue_id).await?;
    let path = note.issue_note_path.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::FileNotFound,
            format!("Issue note {issue_id} has no uploaded file"),
        )
    })?;
    store.read(&path).await
}
