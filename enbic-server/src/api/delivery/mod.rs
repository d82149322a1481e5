//! Bulk Delivery Routes

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/delivery/confirm", post(handler::confirm))
        .route("/api/delivery/stats", get(handler::stats))
}
