//! Blank Card Inventory Routes

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    let ledger_routes = Router::new()
        .route("/receive", post(handler::receive))
        .route("/issue-to-perso", post(handler::issue_to_personalization))
        .route("/adjust", post(handler::adjust))
        .route("/balance", get(handler::balance))
        .route("/ledger", get(handler::ledger))
        .route("/reconciliation", get(handler::reconciliation))
        .route("/low-stock", get(handler::low_stock))
        .route("/low-stock/threshold", put(handler::set_threshold));

    let request_routes = Router::new()
        .route("/requests", get(handler::list_requests).post(handler::create_request))
        .route("/requests/{id}/decide", post(handler::decide))
        .route("/requests/{id}/generate-issue", post(handler::generate_issue))
        .route("/issue-notes", get(handler::list_issue_notes))
        .route("/issue/{id}/sign", post(handler::sign_issue))
        .route("/issue/{id}/file", get(handler::issue_file));

    ledger_routes.merge(request_routes)
}
