//! State (jurisdiction) Routes

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/states", get(handler::list).post(handler::create))
        .route("/api/states/{id}", delete(handler::delete))
}
