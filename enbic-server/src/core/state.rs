use chrono_tz::Tz;
use shared::models::Role;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::artifacts::ArtifactStore;
use crate::audit::{AuditAction, AuditRecord, AuditService, AuditWorker};
use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::config::DEFAULT_ADMIN_PASSWORD;
use crate::core::{BackgroundTasks, Config, Result, TaskKind};
use crate::db::DbService;
use crate::db::repository::{setting, user};
use crate::effects::Outcome;
use crate::reminders::{ReminderTrigger, ReminderWorker};
use shared::util::now_millis;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 克隆成本低：连接池、通道发送端和 `Arc` 都是引用计数句柄。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | audit | 审计日志服务 (通道 → AuditWorker) |
/// | reminders | 提醒重算触发器 (通道 → ReminderWorker) |
/// | artifacts | 上传文件存储 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub audit: AuditService,
    pub reminders: ReminderTrigger,
    pub artifacts: ArtifactStore,
}

impl ServerState {
    /// 初始化服务器状态并启动后台任务
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/enbic.db) 与迁移
    /// 3. 初始管理员与默认设置
    /// 4. 审计 worker、提醒 worker
    pub async fn initialize(config: &Config) -> Result<(Self, BackgroundTasks)> {
        config.ensure_work_dir_structure()?;

        let db = DbService::new(&config.database_path()).await?;
        let pool = db.pool;

        let (audit, audit_rx) = AuditService::new(pool.clone(), config.audit_buffer);
        bootstrap(&pool, config, &audit).await?;

        let mut tasks = BackgroundTasks::new();
        let (reminders, trigger_rx) = ReminderTrigger::channel();

        tasks.spawn(
            "audit_worker",
            TaskKind::Worker,
            AuditWorker::new(pool.clone()).run(audit_rx, tasks.shutdown_token()),
        );
        tasks.spawn(
            "reminder_worker",
            TaskKind::Periodic,
            ReminderWorker::new(
                pool.clone(),
                Duration::from_secs(config.reminder_interval_secs),
                config.reminder_state_threshold,
            )
            .run(trigger_rx, tasks.shutdown_token()),
        );

        let state = Self {
            config: config.clone(),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            artifacts: ArtifactStore::new(config.artifacts_dir(), config.max_artifact_bytes),
            pool,
            audit,
            reminders,
        };
        Ok((state, tasks))
    }

    /// 业务时区
    pub fn tz(&self) -> Tz {
        self.config.timezone
    }

    /// 分发引擎返回的提交后副作用，返回业务结果
    ///
    /// 审计记录进入审计通道；需要时触发提醒重算。副作用失败只记录日志。
    pub async fn apply<T>(&self, outcome: Outcome<T>) -> T {
        let Outcome { value, effects } = outcome;
        for record in effects.audit {
            self.audit.log(record).await;
        }
        if effects.regenerate_reminders {
            self.reminders.fire();
        }
        value
    }
}

/// 首次启动：用户表为空时创建管理员；写入低库存阈值默认值
async fn bootstrap(pool: &SqlitePool, config: &Config, audit: &AuditService) -> Result<()> {
    let now = now_millis();
    setting::seed(
        pool,
        setting::LOW_STOCK_THRESHOLD,
        &config.low_stock_threshold.to_string(),
        now,
    )
    .await?;

    if user::count(pool).await? > 0 {
        return Ok(());
    }

    let hash = hash_password(&config.admin_password)?;
    let admin =
        user::insert(pool, &config.admin_username, "Administrator", &hash, Role::Admin, now).await?;
    audit
        .log_sync(
            AuditRecord::new(AuditAction::UserCreated, "System").new_value(format!(
                "User: {} (Role: {})",
                admin.username,
                admin.role.as_str()
            )),
        )
        .await?;

    tracing::info!(username = %admin.username, "Bootstrap admin account created");
    if !config.is_development() && config.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("Bootstrap admin uses the default password; change ADMIN_PASSWORD");
    }
    Ok(())
}

#[cfg(test)]
impl ServerState {
    /// 测试用状态：内存数据库，无后台 worker
    pub fn for_tests(pool: SqlitePool, work_dir: &std::path::Path) -> Self {
        let config = Config::for_work_dir(work_dir.to_string_lossy());
        let (audit, _audit_rx) = AuditService::new(pool.clone(), 64);
        let (reminders, _trigger_rx) = ReminderTrigger::channel();
        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            artifacts: ArtifactStore::new(config.artifacts_dir(), config.max_artifact_bytes),
            config,
            pool,
            audit,
            reminders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[tokio::test]
    async fn test_initialize_bootstraps_admin_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_work_dir(dir.path().to_string_lossy());

        let (state, tasks) = ServerState::initialize(&config).await.unwrap();
        let admin = user::find_by_username(&state.pool, "admin").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("admin123", &admin.password_hash));
        assert_eq!(
            setting::get(&state.pool, setting::LOW_STOCK_THRESHOLD).await.unwrap().as_deref(),
            Some("100")
        );
        assert_eq!(tasks.len(), 2);
        tasks.shutdown().await;
        state.pool.close().await;

        let (state, tasks) = ServerState::initialize(&config).await.unwrap();
        assert_eq!(user::count(&state.pool).await.unwrap(), 1);
        tasks.shutdown().await;
    }
}
