//! ARN Routes

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/arns", get(handler::list).post(handler::create))
        .route("/api/arns/receive", post(handler::receive))
        .route("/api/arns/pickup", post(handler::pickup))
        .route("/api/arns/{arn}", get(handler::get_by_arn))
        .route("/api/arns/{arn}/status", put(handler::update_status))
        .route("/api/arns/{arn}/document-number", put(handler::set_document_number))
}
