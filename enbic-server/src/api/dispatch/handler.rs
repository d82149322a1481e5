//! Dispatch Batch Handlers

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use shared::AppResult;
use shared::models::{
    ConfirmationResult, ConfirmationUpload, DispatchBatch, DispatchBatchCreate, DispatchSignRequest,
};

use crate::api::files::file_response;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::dispatch::{self, DispatchFile};

/// GET /api/dispatch/batches
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DispatchBatch>>> {
    Ok(Json(dispatch::list(&state.pool).await?))
}

/// POST /api/dispatch/batches
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<DispatchBatchCreate>,
) -> AppResult<Json<DispatchBatch>> {
    let outcome = dispatch::create_batch(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/dispatch/{batch_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(batch_id): Path<String>,
) -> AppResult<Json<DispatchBatch>> {
    Ok(Json(dispatch::get(&state.pool, &batch_id).await?))
}

/// POST /api/dispatch/{batch_id}/sign
pub async fn sign(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(batch_id): Path<String>,
    Json(payload): Json<DispatchSignRequest>,
) -> AppResult<Json<DispatchBatch>> {
    let outcome = dispatch::sign(
        &state.pool,
        &state.artifacts,
        &batch_id,
        payload,
        &current.actor(),
    )
    .await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/dispatch/{batch_id}/confirm
pub async fn confirm(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(batch_id): Path<String>,
) -> AppResult<Json<DispatchBatch>> {
    let outcome = dispatch::confirm_dispatch(&state.pool, &batch_id, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/dispatch/{batch_id}/generate-note
pub async fn generate_note(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(batch_id): Path<String>,
) -> AppResult<Json<DispatchBatch>> {
    let outcome =
        dispatch::generate_delivery_note(&state.pool, &state.artifacts, &batch_id, &current.actor())
            .await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/dispatch/{batch_id}/confirmation
pub async fn upload_confirmation(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(batch_id): Path<String>,
    Json(payload): Json<ConfirmationUpload>,
) -> AppResult<Json<ConfirmationResult>> {
    let outcome = dispatch::upload_confirmation(
        &state.pool,
        &state.artifacts,
        &batch_id,
        payload,
        &current.actor(),
    )
    .await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/dispatch/{batch_id}/file/{delivery|confirmation}
pub async fn file(
    State(state): State<ServerState>,
    Path((batch_id, kind)): Path<(String, String)>,
) -> AppResult<Response> {
    let kind: DispatchFile = kind.parse()?;
    let stored = dispatch::read_file(&state.pool, &state.artifacts, &batch_id, kind).await?;
    Ok(file_response(stored))
}
