//! 审计日志服务
//!
//! - 日志写入（通过 mpsc 通道异步发送给 [`AuditWorker`](super::AuditWorker)）
//! - 直接写入（启动/关闭等无 worker 的场景）

use super::types::{AuditAction, AuditRecord};
use crate::db::repository::{self, RepoResult};
use sqlx::SqlitePool;
use tokio::sync::mpsc;

/// 审计日志服务
///
/// 克隆成本低 (内部只有 `mpsc::Sender` 与连接池句柄)。
#[derive(Clone)]
pub struct AuditService {
    pool: SqlitePool,
    tx: mpsc::Sender<AuditRecord>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("capacity", &self.tx.capacity())
            .finish_non_exhaustive()
    }
}

impl AuditService {
    /// 创建审计服务，返回交给 worker 的接收端
    pub fn new(pool: SqlitePool, buffer_size: usize) -> (Self, mpsc::Receiver<AuditRecord>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Self { pool, tx }, rx)
    }

    /// 异步记录审计日志
    ///
    /// 通道满时等待 (审计日志不丢弃)；通道关闭时只记录错误。
    pub async fn log(&self, record: AuditRecord) {
        let action = record.action;
        if self.tx.send(record).await.is_err() {
            tracing::error!(action = %action, "Audit log channel closed, audit entry lost");
        }
    }

    /// 直接写入审计日志
    pub async fn log_sync(&self, record: AuditRecord) -> RepoResult<()> {
        write_record(&self.pool, &record).await
    }

    /// 系统启动记录
    pub async fn on_startup(&self) {
        let record = AuditRecord::new(AuditAction::SystemStartup, "System")
            .new_value(env!("CARGO_PKG_VERSION"));
        if let Err(e) = self.log_sync(record).await {
            tracing::error!("Failed to record startup audit entry: {}", e);
        }
    }

    /// 系统关闭记录
    pub async fn on_shutdown(&self) {
        if let Err(e) = self
            .log_sync(AuditRecord::new(AuditAction::SystemShutdown, "System"))
            .await
        {
            tracing::error!("Failed to record shutdown audit entry: {}", e);
        }
    }
}

pub(super) async fn write_record(pool: &SqlitePool, record: &AuditRecord) -> RepoResult<()> {
    repository::audit::append(
        pool,
        record.arn.as_deref(),
        record.action.as_str(),
        record.old_value.as_deref(),
        record.new_value.as_deref(),
        &record.operator,
        record.timestamp,
    )
    .await
}
