//! ARN API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Arn, ArnCreate, ArnCreated, ArnQuery, ArnStatus, ArnStatusResponse, ArnStatusUpdate,
    BulkArnResponse,
    DocumentNumberUpdate, PickupRequest, StoreReceiptRequest,
};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::lifecycle;

/// GET /api/arns?state=&status=&search=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ArnQuery>,
) -> AppResult<Json<Vec<Arn>>> {
    Ok(Json(lifecycle::list(&state.pool, &query).await?))
}

/// POST /api/arns
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ArnCreate>,
) -> AppResult<Json<ArnCreated>> {
    let outcome = lifecycle::create(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/arns/{arn}
pub async fn get_by_arn(
    State(state): State<ServerState>,
    Path(arn): Path<String>,
) -> AppResult<Json<Arn>> {
    Ok(Json(lifecycle::get(&state.pool, &arn).await?))
}

/// PUT /api/arns/{arn}/status
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(arn): Path<String>,
    Json(payload): Json<ArnStatusUpdate>,
) -> AppResult<Json<ArnStatusResponse>> {
    let to: ArnStatus = payload.status.trim().parse().map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidTransition,
            format!("Unknown target status: {}", payload.status),
        )
        .with_detail("to", payload.status.clone())
    })?;
    let outcome = lifecycle::transition(&state.pool, &arn, to, &current.actor()).await?;
    Ok(Json(ArnStatusResponse {
        success: true,
        arn: state.apply(outcome).await,
    }))
}

/// PUT /api/arns/{arn}/document-number
pub async fn set_document_number(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(arn): Path<String>,
    Json(payload): Json<DocumentNumberUpdate>,
) -> AppResult<Json<Arn>> {
    let outcome = lifecycle::set_document_number(
        &state.pool,
        &arn,
        &payload.document_number,
        &current.actor(),
    )
    .await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/arns/receive
pub async fn receive(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<StoreReceiptRequest>,
) -> AppResult<Json<BulkArnResponse>> {
    let outcome = lifecycle::receive_into_store(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// POST /api/arns/pickup
pub async fn pickup(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<PickupRequest>,
) -> AppResult<Json<BulkArnResponse>> {
    let outcome = lifecycle::pickup_at_shq(&state.pool, payload, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use crate::test_support::{seed_arn, seed_state};
    use http::StatusCode;
    use serde_json::json;
    use shared::models::{ArnStatus, Role};

    #[tokio::test]
    async fn test_create_and_advance() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        let operator = app.token("op", Role::Operator).await;

        let (status, created) = app
            .request(
                "POST",
                "/api/arns",
                Some(&operator),
                Some(json!({"arn": "ARN-001", "state": "Lagos"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "Awaiting Capture");

        let (status, body) = app
            .request(
                "PUT",
                "/api/arns/ARN-001/status",
                Some(&operator),
                Some(json!({"status": "Pending Delivery"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["from"], "Awaiting Capture");

        let (status, updated) = app
            .request(
                "PUT",
                "/api/arns/ARN-001/status",
                Some(&operator),
                Some(json!({"status": "Submitted to Personalization"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["success"], true);
        assert_eq!(updated["arn"]["status"], "Submitted to Personalization");
        assert!(updated["arn"]["submitted_at"].is_i64());

        let (status, _) = app
            .request(
                "PUT",
                "/api/arns/ARN-001/document-number",
                Some(&operator),
                Some(json!({"documentNumber": "DOC-9"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, fetched) = app.request("GET", "/api/arns/ARN-001", Some(&operator), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["document_number"], "DOC-9");
    }

    #[tokio::test]
    async fn test_unknown_status_and_missing_arn() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        seed_arn(&app.state.pool, "ARN-1", "Lagos", ArnStatus::AwaitingCapture).await;
        let operator = app.token("op", Role::Operator).await;

        let (status, _) = app
            .request(
                "PUT",
                "/api/arns/ARN-1/status",
                Some(&operator),
                Some(json!({"status": "Lost"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.request("GET", "/api/arns/NOPE", Some(&operator), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_supervisor_is_read_only() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        let supervisor = app.token("sup", Role::Supervisor).await;

        let (status, _) = app
            .request(
                "POST",
                "/api/arns",
                Some(&supervisor),
                Some(json!({"arn": "ARN-9", "state": "Lagos"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, list) = app.request("GET", "/api/arns?state=Lagos", Some(&supervisor), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_receive_reports_per_item() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        seed_arn(&app.state.pool, "ARN-1", "Lagos", ArnStatus::Stored).await;
        let operator = app.token("op", Role::Operator).await;

        let (status, body) = app
            .request(
                "POST",
                "/api/arns/receive",
                Some(&operator),
                Some(json!({"arns": ["ARN-1", "ARN-404"]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["success"], true);
        assert_eq!(results[1]["success"], false);
    }
}
