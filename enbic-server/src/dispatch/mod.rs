//! 派送批次与双方签字协议
//!
//! ```text
//! prepared ──(operator + officer 签字)──→ ready_for_dispatch
//!          ──(confirm)──→ dispatched ──(回执上传)──→ delivered
//! ```
//!
//! - [`engine`] - 批次操作
//! - [`note`] - HTML 派送单渲染

pub mod engine;
pub mod note;

pub use engine::{
    confirm_dispatch, create_batch, generate_delivery_note, get, list, read_file, sign,
    upload_confirmation,
};

use shared::{AppError, ErrorCode};
use std::str::FromStr;

/// 可下载的批次文件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFile {
    /// 派送单 (签字上传或生成)
    Delivery,
    /// 送达回执
    Confirmation,
}

impl FromStr for DispatchFile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(DispatchFile::Delivery),
            "confirmation" => Ok(DispatchFile::Confirmation),
            other => Err(AppError::invalid_request(format!(
                "Unknown file kind: {other} (expected delivery or confirmation)"
            ))),
        }
    }
}

pub(crate) fn batch_not_found(batch_id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::BatchNotFound,
        format!("Dispatch batch {batch_id} not found"),
    )
    .with_detail("batch_id", batch_id)
}
