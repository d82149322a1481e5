//! 提醒后台 Worker
//!
//! 启动时立即生成一次，此后按间隔生成；[`ReminderTrigger`] 触发的请求会被合并，
//! 通道容量为 1，已有待处理触发时新的触发直接丢弃。

use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::engine::generate;

/// 提醒重算触发器 (fire-and-forget)
#[derive(Debug, Clone)]
pub struct ReminderTrigger {
    tx: mpsc::Sender<()>,
}

impl ReminderTrigger {
    pub fn channel() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// 请求一次重算；已有待处理请求或 worker 已停止时忽略
    pub fn fire(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::debug!("Reminder worker stopped, trigger ignored");
            }
        }
    }
}

pub struct ReminderWorker {
    pool: SqlitePool,
    interval: Duration,
    state_threshold: i64,
}

impl ReminderWorker {
    pub fn new(pool: SqlitePool, interval: Duration, state_threshold: i64) -> Self {
        Self {
            pool,
            interval,
            state_threshold,
        }
    }

    pub async fn run(self, mut trigger: mpsc::Receiver<()>, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            state_threshold = self.state_threshold,
            "Reminder worker started"
        );
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.run_once("schedule").await,
                next = trigger.recv() => match next {
                    Some(()) => self.run_once("trigger").await,
                    None => break,
                },
            }
        }

        tracing::info!("Reminder worker stopped");
    }

    async fn run_once(&self, source: &str) {
        match generate(&self.pool, self.state_threshold).await {
            Ok(summary) => {
                tracing::debug!(source, created = summary.created(), "Reminder generation finished");
            }
            Err(e) => {
                tracing::error!(source, "Reminder generation failed: {}", e);
            }
        }
    }
}
