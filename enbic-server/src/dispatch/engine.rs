//! 派送批次操作

use shared::models::{
    ArnStatus, ConfirmationResult, ConfirmationUpload, DispatchBatch, DispatchBatchCreate,
    DispatchSignRequest, DispatchSigner, DispatchStatus,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use super::{DispatchFile, batch_not_found, note};
use crate::artifacts::{ArtifactKind, ArtifactStore, StoredFile};
use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::{FIELD_STAFF, OFFICER, OPERATOR};
use crate::db::repository::{self, RepoError, dispatch::NewBatch};
use crate::db::{begin, commit};
use crate::effects::{Effects, Outcome};
use crate::lifecycle::{arn_not_found, state_not_found};
use crate::utils::validation::{MAX_ARN_LEN, MAX_NAME_LEN, optional_trimmed, required_trimmed};

async fn load(pool: &SqlitePool, batch_id: &str) -> AppResult<DispatchBatch> {
    repository::dispatch::find_by_batch_id(pool, batch_id)
        .await?
        .ok_or_else(|| batch_not_found(batch_id))
}

fn wrong_status(batch: &DispatchBatch, operation: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidTransition,
        format!(
            "Cannot {operation} batch {} in status {}",
            batch.batch_id, batch.status
        ),
    )
    .with_detail("batch_id", batch.batch_id.clone())
    .with_detail("status", batch.status.as_str())
}

fn batch_audit(action: AuditAction, batch: &DispatchBatch, operator: &str) -> AuditRecord {
    match &batch.batch_arn {
        Some(arn) => AuditRecord::for_arn(action, arn, operator),
        None => AuditRecord::new(action, operator),
    }
}

pub async fn create_batch(
    pool: &SqlitePool,
    input: DispatchBatchCreate,
    actor: &Actor,
) -> AppResult<Outcome<DispatchBatch>> {
    actor.require("create dispatch batch", OPERATOR)?;
    let batch_id = required_trimmed(&input.batch_id, "batch_id", MAX_NAME_LEN)?;
    let state = required_trimmed(&input.state, "state", MAX_NAME_LEN)?;
    let batch_arn = optional_trimmed(input.batch_arn.as_deref(), "batch_arn", MAX_ARN_LEN)?;
    if input.card_count < 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            "card_count must not be negative",
        )
        .with_detail("field", "card_count"));
    }

    if !repository::jurisdiction::exists(pool, &state).await? {
        return Err(state_not_found(&state));
    }
    if let Some(arn) = batch_arn.as_deref() {
        let found = repository::arn::find_by_arn(pool, arn)
            .await?
            .ok_or_else(|| arn_not_found(arn))?;
        if found.state != state {
            return Err(AppError::validation(format!(
                "ARN {arn} belongs to {}, not {state}",
                found.state
            ))
            .with_detail("arn", arn));
        }
    }

    let batch = repository::dispatch::insert(
        pool,
        NewBatch {
            batch_id: &batch_id,
            state: &state,
            card_count: input.card_count,
            batch_arn: batch_arn.as_deref(),
            created_by: &actor.name,
            created_at: now_millis(),
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::with_message(
            ErrorCode::BatchAlreadyExists,
            format!("Dispatch batch {batch_id} already exists"),
        )
        .with_detail("batch_id", batch_id.clone()),
        other => other.into(),
    })?;

    tracing::info!(batch_id = %batch.batch_id, state = %batch.state, operator = %actor.name, "Dispatch batch created");
    let record = batch_audit(AuditAction::BatchCreated, &batch, &actor.name).new_value(format!(
        "Batch {} (State: {}, Cards: {})",
        batch.batch_id, batch.state, batch.card_count
    ));
    Ok(Outcome::new(batch, Effects::new().audit(record)))
}

/// 记录一方签字；双方齐全时自动进入 ready_for_dispatch
pub async fn sign(
    pool: &SqlitePool,
    store: &ArtifactStore,
    batch_id: &str,
    request: DispatchSignRequest,
    actor: &Actor,
) -> AppResult<Outcome<DispatchBatch>> {
    match request.signer {
        DispatchSigner::Operator => actor.require("sign dispatch as operator", OPERATOR)?,
        DispatchSigner::Officer => actor.require("sign dispatch as officer", OFFICER)?,
    }
    let name = required_trimmed(&request.name, "name", MAX_NAME_LEN)?;
    let batch = load(pool, batch_id).await?;

    if !matches!(
        batch.status,
        DispatchStatus::Prepared | DispatchStatus::ReadyForDispatch
    ) {
        return Err(wrong_status(&batch, "sign"));
    }
    let slot_taken = |batch: &DispatchBatch| {
        AppError::with_message(
            ErrorCode::SignatureAlreadyRecorded,
            format!(
                "The {} signature for batch {} is already recorded",
                request.signer.as_str(),
                batch.batch_id
            ),
        )
        .with_detail("signer", request.signer.as_str())
    };
    if batch.signer_name(request.signer).is_some() && !request.overwrite {
        return Err(slot_taken(&batch));
    }

    let note = match request.file_data.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(data) => Some(store.prepare_data_url(
            ArtifactKind::Dispatch,
            &format!("{}-{}", batch.batch_id, request.signer.as_str()),
            data,
        )?),
        None => None,
    };
    let note_path = note.as_ref().map(|n| n.path());

    let now = now_millis();
    let mut tx = begin(pool).await?;
    let recorded = repository::dispatch::record_signature(
        &mut *tx,
        &batch.batch_id,
        request.signer,
        &name,
        note_path,
        request.overwrite,
        now,
    )
    .await?;
    if !recorded {
        drop(tx);
        let latest = load(pool, batch_id).await?;
        return Err(if latest.signer_name(request.signer).is_some() && !request.overwrite {
            slot_taken(&latest)
        } else {
            wrong_status(&latest, "sign")
        });
    }
    if let (Some(arn), Some(path)) = (batch.batch_arn.as_deref(), note_path) {
        repository::arn::set_delivery_note_path(&mut *tx, arn, path).await?;
    }
    let promoted = repository::dispatch::promote_ready(&mut *tx, &batch.batch_id).await?;
    // 文件写入失败时事务随 tx 丢弃回滚
    if let Some(note) = &note {
        store.write(note).await?;
    }
    commit(tx).await?;

    let updated = load(pool, batch_id).await?;
    tracing::info!(
        batch_id = %updated.batch_id,
        signer = request.signer.as_str(),
        name = %name,
        status = %updated.status,
        "Dispatch batch signed"
    );

    let mut record = batch_audit(AuditAction::BatchSigned, &updated, &actor.name)
        .new_value(format!("{}: {}", request.signer.as_str(), name));
    if let Some(previous) = batch.signer_name(request.signer) {
        record = record.old(format!("{}: {}", request.signer.as_str(), previous));
    }
    let mut effects = Effects::new().audit(record);
    if promoted {
        effects.push_audit(
            batch_audit(AuditAction::BatchReady, &updated, &actor.name)
                .old(DispatchStatus::Prepared.as_str())
                .new_value(DispatchStatus::ReadyForDispatch.as_str()),
        );
    }
    Ok(Outcome::new(updated, effects))
}

/// ready_for_dispatch → dispatched
pub async fn confirm_dispatch(
    pool: &SqlitePool,
    batch_id: &str,
    actor: &Actor,
) -> AppResult<Outcome<DispatchBatch>> {
    actor.require("confirm dispatch", OPERATOR)?;
    let batch = load(pool, batch_id).await?;

    if !batch.fully_signed() {
        let missing: Vec<&str> = [DispatchSigner::Operator, DispatchSigner::Officer]
            .into_iter()
            .filter(|s| batch.signer_name(*s).is_none())
            .map(|s| s.as_str())
            .collect();
        return Err(AppError::new(ErrorCode::SignaturesMissing)
            .with_detail("batch_id", batch.batch_id.clone())
            .with_detail("missing", missing));
    }
    if batch.status != DispatchStatus::ReadyForDispatch {
        return Err(wrong_status(&batch, "dispatch"));
    }
    if !repository::dispatch::mark_dispatched(pool, &batch.batch_id, now_millis()).await? {
        let latest = load(pool, batch_id).await?;
        return Err(wrong_status(&latest, "dispatch"));
    }

    let updated = load(pool, batch_id).await?;
    tracing::info!(batch_id = %updated.batch_id, operator = %actor.name, "Dispatch batch dispatched");
    let record = batch_audit(AuditAction::BatchDispatched, &updated, &actor.name)
        .old(DispatchStatus::ReadyForDispatch.as_str())
        .new_value(DispatchStatus::Dispatched.as_str());
    Ok(Outcome::new(updated, Effects::new().audit(record)))
}

/// 上传送达回执：批次与覆盖的 ARN 一起在单个事务中进入已送达
pub async fn upload_confirmation(
    pool: &SqlitePool,
    store: &ArtifactStore,
    batch_id: &str,
    upload: ConfirmationUpload,
    actor: &Actor,
) -> AppResult<Outcome<ConfirmationResult>> {
    actor.require("upload delivery confirmation", FIELD_STAFF)?;
    let batch = load(pool, batch_id).await?;
    if batch.status != DispatchStatus::Dispatched {
        return Err(wrong_status(&batch, "confirm delivery of"));
    }

    let arn_not_pending = |arn: &str, status: ArnStatus| {
        AppError::with_message(
            ErrorCode::InvalidArnState,
            format!("ARN {arn} is {status}, expected {}", ArnStatus::PendingDelivery),
        )
        .with_detail("arn", arn)
    };
    if let Some(arn) = batch.batch_arn.as_deref() {
        let found = repository::arn::find_by_arn(pool, arn)
            .await?
            .ok_or_else(|| arn_not_found(arn))?;
        if found.status != ArnStatus::PendingDelivery {
            return Err(arn_not_pending(arn, found.status));
        }
    }

    let confirmation = store.prepare_data_url(
        ArtifactKind::Confirmation,
        &format!("{}-confirmation", batch.batch_id),
        &upload.file_data,
    )?;
    let path = confirmation.path();

    let history_note = format!("Dispatch batch {}", batch.batch_id);
    let now = now_millis();
    let mut tx = begin(pool).await?;
    if !repository::dispatch::mark_delivered(&mut *tx, &batch.batch_id, path, now).await? {
        drop(tx);
        let latest = load(pool, batch_id).await?;
        return Err(wrong_status(&latest, "confirm delivery of"));
    }
    let delivered = match batch.batch_arn.as_deref() {
        Some(arn) => {
            let moved = repository::arn::transition(
                &mut *tx,
                arn,
                ArnStatus::PendingDelivery,
                ArnStatus::Delivered,
                now,
            )
            .await?;
            if !moved {
                drop(tx);
                let status = repository::arn::find_by_arn(pool, arn)
                    .await?
                    .map(|a| a.status)
                    .unwrap_or(ArnStatus::PendingDelivery);
                return Err(arn_not_pending(arn, status));
            }
            vec![arn.to_string()]
        }
        None => repository::arn::deliver_all_pending_in_state(&mut *tx, &batch.state, now).await?,
    };
    repository::delivery::insert(
        &mut *tx,
        &batch.state,
        delivered.len() as i64,
        Some(history_note.as_str()),
        Some(&batch.batch_id),
        now,
    )
    .await?;
    store.write(&confirmation).await?;
    commit(tx).await?;

    let updated = load(pool, batch_id).await?;
    tracing::info!(
        batch_id = %updated.batch_id,
        delivered = delivered.len(),
        operator = %actor.name,
        "Dispatch batch delivered"
    );

    let mut effects = Effects::new().regenerate_reminders().audit(
        batch_audit(AuditAction::BatchDelivered, &updated, &actor.name)
            .old(DispatchStatus::Dispatched.as_str())
            .new_value(DispatchStatus::Delivered.as_str()),
    );
    for arn in &delivered {
        effects.push_audit(
            AuditRecord::for_arn(AuditAction::StatusUpdated, arn, &actor.name)
                .old(ArnStatus::PendingDelivery.as_str())
                .new_value(format!("Delivered (Batch: {})", updated.batch_id)),
        );
    }

    Ok(Outcome::new(
        ConfirmationResult {
            batch: updated,
            delivered_count: delivered.len() as i64,
        },
        effects,
    ))
}

/// 生成 HTML 派送单并记录路径，可重复生成
pub async fn generate_delivery_note(
    pool: &SqlitePool,
    store: &ArtifactStore,
    batch_id: &str,
    actor: &Actor,
) -> AppResult<Outcome<DispatchBatch>> {
    actor.require("generate delivery note", OPERATOR)?;
    let batch = load(pool, batch_id).await?;
    let delivered = |batch_id: &str| {
        AppError::with_message(
            ErrorCode::BatchDelivered,
            format!("Dispatch batch {batch_id} is already delivered"),
        )
        .with_detail("batch_id", batch_id)
    };
    if batch.status == DispatchStatus::Delivered {
        return Err(delivered(&batch.batch_id));
    }

    let arns = match batch.batch_arn.as_deref() {
        Some(arn) => vec![arn.to_string()],
        None => repository::arn::list_pending_in_state(pool, &batch.state).await?,
    };
    let html = note::render_delivery_note(&batch, &arns, now_millis())?;
    let pending = store.prepare_bytes(
        ArtifactKind::Dispatch,
        &format!("{}-delivery-note", batch.batch_id),
        "html",
        html.into_bytes(),
    );
    let path = pending.path().to_string();

    let mut tx = begin(pool).await?;
    if !repository::dispatch::set_delivery_note_path(&mut *tx, &batch.batch_id, &path).await? {
        drop(tx);
        return Err(delivered(&batch.batch_id));
    }
    if let Some(arn) = batch.batch_arn.as_deref() {
        repository::arn::set_delivery_note_path(&mut *tx, arn, &path).await?;
    }
    store.write(&pending).await?;
    commit(tx).await?;

    let updated = load(pool, batch_id).await?;
    tracing::info!(batch_id = %updated.batch_id, path = %path, arns = arns.len(), "Delivery note generated");
    let record =
        batch_audit(AuditAction::DeliveryNoteGenerated, &updated, &actor.name).new_value(path);
    Ok(Outcome::new(updated, Effects::new().audit(record)))
}

pub async fn list(pool: &SqlitePool) -> AppResult<Vec<DispatchBatch>> {
    Ok(repository::dispatch::list(pool).await?)
}

pub async fn get(pool: &SqlitePool, batch_id: &str) -> AppResult<DispatchBatch> {
    load(pool, batch_id).await
}

/// 读取批次的派送单或回执
pub async fn read_file(
    pool: &SqlitePool,
    store: &ArtifactStore,
    batch_id: &str,
    file: DispatchFile,
) -> AppResult<StoredFile> {
    let batch = load(pool, batch_id).await?;
    let path = match file {
        DispatchFile::Delivery => batch.delivery_note_path,
        DispatchFile::Confirmation => batch.confirmation_note_path,
    };
    let path = path.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::FileNotFound,
            format!("Batch {batch_id} has no such file"),
        )
    })?;
    store.read(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::test_support::{admin, officer, operator, seed_arn, seed_state, supervisor};

    const PDF: &str = "data:application/pdf;base64,JVBERi0xLjQK";

    fn create_input(batch_id: &str, batch_arn: Option<&str>) -> DispatchBatchCreate {
        DispatchBatchCreate {
            batch_id: batch_id.into(),
            state: "Lagos".into(),
            card_count: 3,
            batch_arn: batch_arn.map(str::to_string),
        }
    }

    fn sign_as(signer: DispatchSigner, name: &str) -> DispatchSignRequest {
        DispatchSignRequest {
            signer,
            name: name.into(),
            file_data: None,
            overwrite: false,
        }
    }

    async fn setup() -> (SqlitePool, ArtifactStore, tempfile::TempDir) {
        let pool = test_pool().await;
        seed_state(&pool, "Lagos").await;
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 1024 * 1024);
        (pool, store, dir)
    }

    #[tokio::test]
    async fn test_full_protocol_round_trip() {
        let (pool, store, _dir) = setup().await;
        for arn in ["A-1", "A-2", "A-3"] {
            seed_arn(&pool, arn, "Lagos", ArnStatus::PendingDelivery).await;
        }
        let officer = officer(&pool, "officer1").await;

        let batch = create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap()
            .value;
        assert_eq!(batch.status, DispatchStatus::Prepared);

        let signed = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Ada"), &operator())
            .await
            .unwrap();
        assert_eq!(signed.value.status, DispatchStatus::Prepared);
        assert_eq!(signed.effects.audit.len(), 1);

        let signed = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "Bola"), &officer)
            .await
            .unwrap();
        assert_eq!(signed.value.status, DispatchStatus::ReadyForDispatch);
        assert_eq!(signed.effects.audit[1].action, AuditAction::BatchReady);

        let dispatched = confirm_dispatch(&pool, "B-1", &operator()).await.unwrap().value;
        assert_eq!(dispatched.status, DispatchStatus::Dispatched);
        assert!(dispatched.dispatched_at.is_some());

        let result = upload_confirmation(
            &pool,
            &store,
            "B-1",
            ConfirmationUpload {
                file_data: PDF.into(),
            },
            &officer,
        )
        .await
        .unwrap();
        assert_eq!(result.value.delivered_count, 3);
        assert_eq!(result.value.batch.status, DispatchStatus::Delivered);
        assert!(result.value.batch.delivered_at.is_some());
        assert!(result.effects.regenerate_reminders);

        for arn in ["A-1", "A-2", "A-3"] {
            let arn = repository::arn::find_by_arn(&pool, arn).await.unwrap().unwrap();
            assert_eq!(arn.status, ArnStatus::Delivered);
        }
        let history = repository::delivery::find_by_state(&pool, "Lagos").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].batch_id.as_deref(), Some("B-1"));

        let file = read_file(&pool, &store, "B-1", DispatchFile::Confirmation)
            .await
            .unwrap();
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF-1.4\n");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (pool, _store, _dir) = setup().await;
        seed_state(&pool, "Kano").await;
        seed_arn(&pool, "K-1", "Kano", ArnStatus::PendingDelivery).await;

        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        let dup = create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap_err();
        assert_eq!(dup.code, ErrorCode::BatchAlreadyExists);

        let wrong_state = create_batch(&pool, create_input("B-2", Some("K-1")), &operator())
            .await
            .unwrap_err();
        assert_eq!(wrong_state.code, ErrorCode::ValidationFailed);

        let missing = create_batch(&pool, create_input("B-3", Some("NOPE")), &operator())
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::ArnNotFound);

        let mut negative = create_input("B-4", None);
        negative.card_count = -1;
        let err = create_batch(&pool, negative, &operator()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
    }

    #[tokio::test]
    async fn test_signature_slots_are_role_gated() {
        let (pool, store, _dir) = setup().await;
        let officer = officer(&pool, "officer1").await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();

        let err = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "X"), &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
        let err = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "X"), &officer)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
        assert!(
            sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "X"), &supervisor())
                .await
                .is_err()
        );

        // admin 可签任意槽位
        let batch = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "Root"), &admin())
            .await
            .unwrap()
            .value;
        assert_eq!(batch.officer_name.as_deref(), Some("Root"));
    }

    #[tokio::test]
    async fn test_overwrite_requires_flag() {
        let (pool, store, _dir) = setup().await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Ada"), &operator())
            .await
            .unwrap();

        let err = sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Eve"), &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SignatureAlreadyRecorded);

        let mut request = sign_as(DispatchSigner::Operator, "Eve");
        request.overwrite = true;
        let outcome = sign(&pool, &store, "B-1", request, &operator()).await.unwrap();
        assert_eq!(outcome.value.operator_name.as_deref(), Some("Eve"));
        assert_eq!(outcome.effects.audit[0].old_value.as_deref(), Some("operator: Ada"));
    }

    #[tokio::test]
    async fn test_confirm_requires_both_signatures() {
        let (pool, store, _dir) = setup().await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Ada"), &operator())
            .await
            .unwrap();

        let err = confirm_dispatch(&pool, "B-1", &operator()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SignaturesMissing);
        assert_eq!(err.http_status(), http::StatusCode::PRECONDITION_FAILED);
        assert_eq!(get(&pool, "B-1").await.unwrap().status, DispatchStatus::Prepared);
    }

    #[tokio::test]
    async fn test_signing_after_dispatch_is_rejected() {
        let (pool, store, _dir) = setup().await;
        let officer = officer(&pool, "officer1").await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Ada"), &operator())
            .await
            .unwrap();
        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "Bola"), &officer)
            .await
            .unwrap();
        confirm_dispatch(&pool, "B-1", &operator()).await.unwrap();

        let mut request = sign_as(DispatchSigner::Operator, "Eve");
        request.overwrite = true;
        let err = sign(&pool, &store, "B-1", request, &operator()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let err = confirm_dispatch(&pool, "B-1", &operator()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[tokio::test]
    async fn test_upload_requires_dispatched() {
        let (pool, store, _dir) = setup().await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        let err = upload_confirmation(
            &pool,
            &store,
            "B-1",
            ConfirmationUpload {
                file_data: PDF.into(),
            },
            &operator(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[tokio::test]
    async fn test_single_arn_batch_with_signature_file() {
        let (pool, store, _dir) = setup().await;
        seed_arn(&pool, "A-1", "Lagos", ArnStatus::PendingDelivery).await;
        seed_arn(&pool, "A-2", "Lagos", ArnStatus::PendingDelivery).await;
        let officer = officer(&pool, "officer1").await;

        create_batch(&pool, create_input("B-1", Some("A-1")), &operator())
            .await
            .unwrap();
        let mut request = sign_as(DispatchSigner::Operator, "Ada");
        request.file_data = Some(PDF.into());
        let batch = sign(&pool, &store, "B-1", request, &operator()).await.unwrap().value;
        let note_path = batch.delivery_note_path.clone().unwrap();
        assert!(note_path.starts_with("dispatch/B-1-operator-"));

        let arn = repository::arn::find_by_arn(&pool, "A-1").await.unwrap().unwrap();
        assert_eq!(arn.delivery_note_path.as_deref(), Some(note_path.as_str()));

        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Officer, "Bola"), &officer)
            .await
            .unwrap();
        confirm_dispatch(&pool, "B-1", &operator()).await.unwrap();
        let result = upload_confirmation(
            &pool,
            &store,
            "B-1",
            ConfirmationUpload {
                file_data: PDF.into(),
            },
            &operator(),
        )
        .await
        .unwrap()
        .value;
        assert_eq!(result.delivered_count, 1);

        let other = repository::arn::find_by_arn(&pool, "A-2").await.unwrap().unwrap();
        assert_eq!(other.status, ArnStatus::PendingDelivery);
    }

    #[tokio::test]
    async fn test_generate_delivery_note() {
        let (pool, store, _dir) = setup().await;
        seed_arn(&pool, "A-1", "Lagos", ArnStatus::PendingDelivery).await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();

        let batch = generate_delivery_note(&pool, &store, "B-1", &operator())
            .await
            .unwrap()
            .value;
        let path = batch.delivery_note_path.unwrap();
        assert!(path.starts_with("dispatch/") && path.ends_with(".html"));

        let file = read_file(&pool, &store, "B-1", DispatchFile::Delivery)
            .await
            .unwrap();
        assert_eq!(file.content_type, "text/html");
        let html = String::from_utf8(file.bytes).unwrap();
        assert!(html.contains("A-1"));

        let err = read_file(&pool, &store, "B-1", DispatchFile::Confirmation)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_signature() {
        let (pool, _store, dir) = setup().await;
        let root = dir.path().join("blocked");
        std::fs::write(&root, b"file").unwrap();
        let broken = ArtifactStore::new(&root, 1024 * 1024);
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();

        let mut request = sign_as(DispatchSigner::Operator, "Ada");
        request.file_data = Some(PDF.into());
        let err = sign(&pool, &broken, "B-1", request, &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);

        let batch = get(&pool, "B-1").await.unwrap();
        assert!(batch.operator_name.is_none());
        assert!(batch.delivery_note_path.is_none());

        let err = generate_delivery_note(&pool, &broken, "B-1", &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(get(&pool, "B-1").await.unwrap().delivery_note_path.is_none());
    }

    #[tokio::test]
    async fn test_rejected_signature_leaves_no_file() {
        let (pool, store, dir) = setup().await;
        create_batch(&pool, create_input("B-1", None), &operator())
            .await
            .unwrap();
        sign(&pool, &store, "B-1", sign_as(DispatchSigner::Operator, "Ada"), &operator())
            .await
            .unwrap();

        let mut request = sign_as(DispatchSigner::Operator, "Eve");
        request.file_data = Some(PDF.into());
        let err = sign(&pool, &store, "B-1", request, &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SignatureAlreadyRecorded);
        assert!(!dir.path().join("dispatch").exists());
    }

    #[tokio::test]
    async fn test_unknown_batch() {
        let (pool, store, _dir) = setup().await;
        let err = sign(&pool, &store, "NOPE", sign_as(DispatchSigner::Operator, "A"), &operator())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchNotFound);
        assert!("archive".parse::<DispatchFile>().is_err());
    }
}
