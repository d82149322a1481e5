//! Bulk Delivery Handlers

use axum::{Json, extract::State};
use shared::AppResult;
use shared::models::{DeliveryConfirmRequest, DeliveryConfirmResponse, DeliveryStat};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::lifecycle;

/// POST /api/delivery/confirm - 某州全部待送达 ARN 标记为已送达
pub async fn confirm(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<DeliveryConfirmRequest>,
) -> AppResult<Json<DeliveryConfirmResponse>> {
    let outcome = lifecycle::confirm_delivery_for_state(
        &state.pool,
        &payload.state,
        payload.notes.as_deref(),
        &current.actor(),
    )
    .await?;
    Ok(Json(state.apply(outcome).await))
}

/// GET /api/delivery/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<Vec<DeliveryStat>>> {
    Ok(Json(lifecycle::delivery_stats(&state.pool).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use crate::test_support::{seed_arn, seed_state};
    use http::StatusCode;
    use serde_json::json;
    use shared::models::{ArnStatus, Role};

    #[tokio::test]
    async fn test_confirm_state_delivery() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        for arn in ["L-1", "L-2", "L-3"] {
            seed_arn(&app.state.pool, arn, "Lagos", ArnStatus::PendingDelivery).await;
        }
        let operator = app.token("op", Role::Operator).await;

        let (status, body) = app
            .request(
                "POST",
                "/api/delivery/confirm",
                Some(&operator),
                Some(json!({"state": "Lagos", "notes": "van 2"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);

        let (status, again) = app
            .request(
                "POST",
                "/api/delivery/confirm",
                Some(&operator),
                Some(json!({"state": "Lagos"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["count"], 0);

        let (status, stats) = app.request("GET", "/api/delivery/stats", Some(&operator), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(stats.is_array());
    }
}
