//! Reminder Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::AppResult;
use shared::models::{GenerateSummary, ReminderView, ResolveOutcome};

use crate::auth::CurrentUser;
use crate::auth::permissions::FIELD_STAFF;
use crate::core::ServerState;
use crate::reminders;

/// GET /api/reminders - 未处理提醒
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ReminderView>>> {
    Ok(Json(reminders::list_unresolved(&state.pool).await?))
}

/// POST /api/reminders/generate - 立即重算
pub async fn generate(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<GenerateSummary>> {
    current.actor().require("generate reminders", FIELD_STAFF)?;
    let summary =
        reminders::generate(&state.pool, state.config.reminder_state_threshold).await?;
    Ok(Json(summary))
}

/// POST /api/reminders/{id}/resolve
pub async fn resolve(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ResolveOutcome>> {
    let outcome = reminders::resolve(&state.pool, id, &current.actor()).await?;
    Ok(Json(state.apply(outcome).await))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use crate::test_support::{age_arn, seed_arn, seed_state};
    use http::StatusCode;
    use shared::models::{ArnStatus, Role};

    #[tokio::test]
    async fn test_generate_list_resolve() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        seed_arn(&app.state.pool, "A-1", "Lagos", ArnStatus::AwaitingCapture).await;
        age_arn(&app.state.pool, "A-1", 10).await;
        let operator = app.token("op", Role::Operator).await;
        let supervisor = app.token("sup", Role::Supervisor).await;

        let (status, _) = app
            .request("POST", "/api/reminders/generate", Some(&supervisor), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, summary) = app
            .request("POST", "/api/reminders/generate", Some(&operator), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["pending_capture"], 1);

        let (status, list) = app.request("GET", "/api/reminders", Some(&supervisor), None).await;
        assert_eq!(status, StatusCode::OK);
        let id = list[0]["id"].as_i64().unwrap();

        let (status, resolved) = app
            .request("POST", &format!("/api/reminders/{id}/resolve"), Some(&operator), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["success"], true);

        let (status, _) = app
            .request("POST", "/api/reminders/9999/resolve", Some(&operator), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
