//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 初始化状态、启动后台任务并监听，直到收到 Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let (state, tasks) = ServerState::initialize(&self.config).await?;
        tasks.log_summary();
        state.audit.on_startup().await;

        let app = api::build_app(state.clone());
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            environment = %self.config.environment,
            timezone = %self.config.timezone,
            "ENBIC server listening on {}",
            addr
        );

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        tasks.check_health();
        tasks.shutdown().await;
        state.audit.on_shutdown().await;
        state.pool.close().await;

        served?;
        Ok(())
    }
}
