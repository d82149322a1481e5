//! ARN 生命周期引擎
//!
//! ```text
//! Awaiting Capture → Submitted to Personalization → Pending Delivery → Delivered
//!                                                                   └→ Collected at SHQ
//! Stored ──────────────────────────────────────────→ Pending Delivery
//! ```
//!
//! - [`graph`] - 合法转换
//! - [`engine`] - 单条/批量状态变更、文档号、入库、自提
//! - [`states`] - 辖区 (State) 管理

pub mod engine;
pub mod graph;
pub mod states;

pub use engine::{
    confirm_delivery_for_state, create, delivery_stats, get, list, pickup_at_shq,
    receive_into_store, set_document_number, transition,
};

use shared::{AppError, ErrorCode};

pub(crate) fn arn_not_found(arn: &str) -> AppError {
    AppError::with_message(ErrorCode::ArnNotFound, format!("ARN {arn} not found")).with_detail("arn", arn)
}

pub(crate) fn state_not_found(state: &str) -> AppError {
    AppError::with_message(ErrorCode::StateNotFound, format!("State {state} not found"))
        .with_detail("state", state)
}
