use shared::AppError;
use thiserror::Error;

use crate::auth::JwtError;
use crate::db::repository::RepoError;

/// 服务器启动与运行期错误
///
/// 业务错误统一使用 [`AppError`]；这里只覆盖进程级失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("JWT 配置错误: {0}")]
    Jwt(#[from] JwtError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    App(#[from] AppError),

    #[error("数据库错误: {0}")]
    Repo(#[from] RepoError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
