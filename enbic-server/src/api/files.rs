//! 附件下载响应

use axum::response::{IntoResponse, Response};
use http::header;

use crate::artifacts::StoredFile;

/// 以猜测的 content type 返回文件内容
pub fn file_response(file: StoredFile) -> Response {
    ([(header::CONTENT_TYPE, file.content_type)], file.bytes).into_response()
}
