//! Shared types for the ENBIC tracking server
//!
//! Domain models, error codes and API DTOs used by the server crate and by
//! any client talking to it.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
