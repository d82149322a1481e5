//! Reminder Routes

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/reminders", get(handler::list))
        .route("/api/reminders/generate", post(handler::generate))
        .route("/api/reminders/{id}/resolve", post(handler::resolve))
}
