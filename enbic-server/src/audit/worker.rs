//! 审计日志后台 Worker
//!
//! 从 mpsc 通道消费 [`AuditRecord`]，写入 audit_log 表。
//! 收到关闭信号后先排空通道再退出。

use super::service::write_record;
use super::types::AuditRecord;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct AuditWorker {
    pool: SqlitePool,
}

impl AuditWorker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 运行 worker（直到通道关闭或收到关闭信号）
    pub async fn run(self, mut rx: mpsc::Receiver<AuditRecord>, shutdown: CancellationToken) {
        tracing::info!("Audit log worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    rx.close();
                    while let Some(record) = rx.recv().await {
                        self.write(record).await;
                    }
                    break;
                }
                next = rx.recv() => match next {
                    Some(record) => self.write(record).await,
                    None => break,
                },
            }
        }

        tracing::info!("Audit log worker stopped");
    }

    async fn write(&self, record: AuditRecord) {
        match write_record(&self.pool, &record).await {
            Ok(()) => {
                tracing::debug!(action = %record.action, arn = ?record.arn, "Audit entry recorded");
            }
            Err(e) => {
                tracing::error!(action = %record.action, "Failed to write audit entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditService};
    use crate::db::{repository, test_pool};

    #[tokio::test]
    async fn test_worker_drains_channel_on_shutdown() {
        let pool = test_pool().await;
        let (service, rx) = AuditService::new(pool.clone(), 16);
        let shutdown = CancellationToken::new();

        for i in 0..3 {
            service
                .log(
                    AuditRecord::for_arn(AuditAction::StatusUpdated, "ARN-1", "ada")
                        .new_value(format!("step {i}")),
                )
                .await;
        }
        shutdown.cancel();
        AuditWorker::new(pool.clone()).run(rx, shutdown).await;

        let entries = repository::audit::find_by_arn(&pool, "ARN-1").await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.action == "STATUS_UPDATED"));
    }
}
