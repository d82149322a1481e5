//! Report Routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use shared::AppResult;
use shared::models::{ReportPage, ReportQuery};

use crate::core::ServerState;
use crate::reports;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports/{report_type}", get(report))
}

/// GET /api/reports/{type}?search=&state=&date_from=&date_to=&page=&page_size=
async fn report(
    State(state): State<ServerState>,
    Path(report_type): Path<String>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportPage>> {
    Ok(Json(
        reports::report(&state.pool, &report_type, &query, state.tz()).await?,
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use crate::test_support::{seed_arn, seed_state};
    use http::StatusCode;
    use shared::models::{ArnStatus, Role};

    #[tokio::test]
    async fn test_report_query_string() {
        let app = TestApp::new().await;
        seed_state(&app.state.pool, "Lagos").await;
        seed_arn(&app.state.pool, "A-1", "Lagos", ArnStatus::AwaitingCapture).await;
        let token = app.token("sup", Role::Supervisor).await;

        let (status, page) = app
            .request(
                "GET",
                "/api/reports/pending-capture?state=Lagos&page=1&page_size=10",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["type"], "pending-capture");
        assert_eq!(page["total"], 1);
        assert_eq!(page["page_size"], 10);

        let (status, _) = app
            .request("GET", "/api/reports/nope", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .request(
                "GET",
                "/api/reports/submitted?date_from=2024-13-01",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
