use chrono_tz::Tz;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::JwtConfig;
use crate::core::Result;
use crate::inventory::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::reminders::DEFAULT_STATE_THRESHOLD;
use crate::utils::time::parse_timezone;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 数据库、附件、日志 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | UTC | 报表/对账的业务时区 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | JWT_SECRET | debug 构建自动生成 | 至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 720 | 令牌有效期 |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | admin / admin123 | 初始管理员 |
/// | LOW_STOCK_THRESHOLD | 100 | 低库存阈值初始值 |
/// | REMINDER_INTERVAL_SECS | 86400 | 提醒生成间隔 |
/// | REMINDER_STATE_THRESHOLD | 3 | 州级提醒阈值 |
/// | MAX_ARTIFACT_BYTES | 10485760 | 上传文件大小上限 |
/// | AUDIT_BUFFER | 1024 | 审计通道容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/enbic HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    /// 业务时区
    pub timezone: Tz,
    pub log_level: String,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub admin_username: String,
    pub admin_password: String,
    pub low_stock_threshold: i64,
    pub reminder_interval_secs: u64,
    pub reminder_state_threshold: i64,
    pub max_artifact_bytes: usize,
    pub audit_buffer: usize,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。时区无法识别或 JWT 密钥不合规时返回错误。
    pub fn from_env() -> Result<Self> {
        let timezone = std::env::var("TIMEZONE").unwrap_or_else(|_| "UTC".into());
        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: parse_timezone(&timezone)?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            jwt: JwtConfig::from_env()?,
            admin_username: std::env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into()),
            low_stock_threshold: env_or("LOW_STOCK_THRESHOLD", DEFAULT_LOW_STOCK_THRESHOLD),
            reminder_interval_secs: env_or("REMINDER_INTERVAL_SECS", 86_400),
            reminder_state_threshold: env_or("REMINDER_STATE_THRESHOLD", DEFAULT_STATE_THRESHOLD),
            max_artifact_bytes: env_or("MAX_ARTIFACT_BYTES", 10 * 1024 * 1024),
            audit_buffer: env_or("AUDIT_BUFFER", 1024),
        })
    }

    /// 测试用配置 (固定密钥，不读取环境变量)
    pub fn for_work_dir(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "development".into(),
            timezone: chrono_tz::UTC,
            log_level: "info".into(),
            log_json: false,
            jwt: JwtConfig::with_secret("enbic-development-secret-0123456789abcdef"),
            admin_username: DEFAULT_ADMIN_USERNAME.into(),
            admin_password: DEFAULT_ADMIN_PASSWORD.into(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            reminder_interval_secs: 86_400,
            reminder_state_threshold: DEFAULT_STATE_THRESHOLD,
            max_artifact_bytes: 10 * 1024 * 1024,
            audit_buffer: 1024,
        }
    }

    /// 数据库文件路径: work_dir/enbic.db
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("enbic.db")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("artifacts")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.artifacts_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
