//! 审计日志模块：追加写入的操作记录
//!
//! # 架构
//!
//! ```text
//! 引擎返回 Effects
//!   └─ ServerState::apply_effects() → AuditService::log() → mpsc → AuditWorker → audit_log 表
//! ```
//!
//! 审计写入失败只记录日志，不影响已提交的业务操作。

pub mod service;
pub mod types;
pub mod worker;

pub use service::AuditService;
pub use types::{AuditAction, AuditRecord};
pub use worker::AuditWorker;
