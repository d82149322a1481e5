//! ENBIC Tracking Server - ARN 卡片追踪系统服务端
//!
//! # 架构概述
//!
//! - **生命周期** (`lifecycle`): ARN 状态机、州、批量送达、入库与自提
//! - **派送** (`dispatch`): 派送批次与双方签名协议
//! - **库存** (`inventory`): 空白卡台账、申请审批、发放单
//! - **提醒** (`reminders`): 幂等重算的提醒与后台 worker
//! - **报表** (`reports`): 分页报表
//! - **认证** (`auth`): JWT + Argon2，显式 `Actor` 权限检查
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! enbic-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池、迁移、repository
//! ├── audit/         # 审计日志 worker
//! ├── artifacts/     # 上传文件存储
//! └── utils/         # 日志、时间、校验
//! ```

pub mod api;
pub mod artifacts;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod dispatch;
pub mod effects;
pub mod inventory;
pub mod lifecycle;
pub mod reminders;
pub mod reports;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export 公共类型
pub use auth::{Actor, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use effects::{Effects, Outcome};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env、读取配置、准备工作目录并初始化日志
pub fn setup_environment() -> core::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    config.ensure_work_dir_structure()?;

    let log_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        log_dir.to_str(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ______ _   __ ____   ____ ______
   / ____// | / // __ ) /  _// ____/
  / __/  /  |/ // __  | / / / /
 / /___ / /|  // /_/ /_/ / / /___
/_____//_/ |_//_____//___/ \____/
    "#
    );
}
