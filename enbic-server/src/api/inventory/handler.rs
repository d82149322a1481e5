//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use shared::AppResult;
use shared::models::{
    BalanceView, BlankCardRequest, BlankCardRequestCreate, BlankCardRequestView,
    IssueSignRequest, IssueToPersonalization, IssueNote, LedgerQuery, LowStock, ReconcileQuery,
    Reconciliation, RequestDecision, StockAdjust, StockMovement, StockReceive, ThresholdUpdate,
};

use crate::api::files::file_response;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::inventory;

// ========== Ledger ==========

/// POST /api/inventory/receive
pub async fn receive(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<StockReceive>,
) -> AppResult<Json<StockMovement>> {
    let outcome = inventory::receive(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/inventory/issue-to-perso
pub async fn issue_to_personalization(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<IssueToPersonalization>,
) -> AppResult<Json<StockMovement>> {
    let outcome =
        inventory::issue_to_personalization(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/inventory/adjust
pub async fn adjust(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<StockMovement>> {
    let outcome = inventory::adjust(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/inventory/balance
pub async fn balance(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<BalanceView>> {
    Ok(Json(inventory::balances(&state.pool, &current.actor()).await?))
}

/// GET /api/inventory/ledger?limit=
pub async fn ledger(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<LedgerQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    Ok(Json(inventory::ledger(&state.pool, &query, &current.actor()).await?))
}

/// GET /api/inventory/reconciliation?date_from=&date_to=&partition=
pub async fn reconciliation(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ReconcileQuery>,
) -> AppResult<Json<Reconciliation>> {
    let result = inventory::reconcile(&state.pool, &query, &current.actor(), state.tz()).await?;
    Ok(Json(result))
}

/// GET /api/inventory/low-stock
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<LowStock>> {
    Ok(Json(inventory::low_stock_check(&state.pool).await?))
}

/// PUT /api/inventory/low-stock/threshold
pub async fn set_threshold(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ThresholdUpdate>,
) -> AppResult<Json<LowStock>> {
    let outcome =
        inventory::set_low_stock_threshold(&state.pool, payload.threshold, &current.actor())
            .await?;
    Ok(Json(state.apply(outcome).await))
}

// ========== Requests & issue notes ==========

/// GET /api/inventory/requests
pub async fn list_requests(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<BlankCardRequestView>>> {
    Ok(Json(inventory::list_requests(&state.pool, &current.actor()).await?))
}

/// POST /api/inventory/requests
pub async fn create_request(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<BlankCardRequestCreate>,
) -> AppResult<Json<BlankCardRequest>> {
    let outcome = inventory::create_request(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/inventory/requests/{id}/decide
pub async fn decide(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RequestDecision>,
) -> AppResult<Json<BlankCardRequest>> {
    let outcome = inventory::decide(&state.pool, id, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/inventory/requests/{id}/generate-issue
pub async fn generate_issue(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<IssueNote>> {
    let outcome = inventory::generate_issue_note(&state.pool, id, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/inventory/issue-notes
pub async fn list_issue_notes(State(state): State<ServerState>) -> AppResult<Json<Vec<IssueNote>>> {
    Ok(Json(inventory::list_issue_notes(&state.pool).await?))
}

/// POST /api/inventory/issue/{id}/sign
pub async fn sign_issue(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<IssueSignRequest>,
) -> AppResult<Json<IssueNote>> {
    let outcome = inventory::sign_issue_note(
        &state.pool,
        &state.artifacts,
        id,
        payload,
        &current.actor(),
    )
    .await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/inventory/issue/{id}/file
pub async fn issue_file(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let stored = inventory::read_issue_note_file(&state.pool, &state.artifacts, id).await?;
    Ok(file_response(stored))
}
