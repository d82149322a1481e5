//! Dispatch Batch Routes
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/dispatch/batches | GET/POST | 列表 / 创建 |
//! | /api/dispatch/{batchId} | GET | 详情 |
//! | /api/dispatch/{batchId}/sign | POST | 操作员或官员签名 |
//! | /api/dispatch/{batchId}/confirm | POST | 确认发出 |
//! | /api/dispatch/{batchId}/generate-note | POST | 生成派送单 |
//! | /api/dispatch/{batchId}/confirmation | POST | 上传送达回执 |
//! | /api/dispatch/{batchId}/file/{kind} | GET | 下载派送单或回执 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dispatch/batches", get(handler::list).post(handler::create))
        .route("/api/dispatch/{batch_id}", get(handler::get_by_id))
        .route("/api/dispatch/{batch_id}/sign", post(handler::sign))
        .route("/api/dispatch/{batch_id}/confirm", post(handler::confirm))
        .route("/api/dispatch/{batch_id}/generate-note", post(handler::generate_note))
        .route("/api/dispatch/{batch_id}/confirmation", post(handler::upload_confirmation))
        .route("/api/dispatch/{batch_id}/file/{kind}", get(handler::file))
}
