//! State API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Jurisdiction, JurisdictionCreate};
use shared::{ApiResponse, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::lifecycle::states;

/// GET /api/states
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Jurisdiction>>> {
    Ok(Json(states::list_states(&state.pool).await?))
}

/// POST /api/states
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<JurisdictionCreate>,
) -> AppResult<Json<Jurisdiction>> {
    let outcome = states::create_state(&state.pool, &payload.name, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

/// DELETE /api/states/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let outcome = states::delete_state(&state.pool, id, &current.actor()).await?;
    state.apply(outcome).await;
    Ok(Json(ApiResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use crate::test_support::seed_arn;
    use http::StatusCode;
    use serde_json::json;
    use shared::models::{ArnStatus, Role};

    #[tokio::test]
    async fn test_state_crud() {
        let app = TestApp::new().await;
        let operator = app.token("op", Role::Operator).await;
        let admin = app.token("root", Role::Admin).await;

        let (status, created) = app
            .request("POST", "/api/states", Some(&operator), Some(json!({"name": "Lagos"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_i64().unwrap();

        let (status, _) = app
            .request("POST", "/api/states", Some(&operator), Some(json!({"name": "Lagos"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        seed_arn(&app.state.pool, "A-1", "Lagos", ArnStatus::AwaitingCapture).await;
        let (status, body) = app
            .request("DELETE", &format!("/api/states/{id}"), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("Lagos"));

        let (status, _) = app
            .request("DELETE", &format!("/api/states/{id}"), Some(&operator), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, list) = app.request("GET", "/api/states", Some(&operator), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}
