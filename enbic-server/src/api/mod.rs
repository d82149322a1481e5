//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、登出、当前用户
//! - [`users`] - 用户管理 (管理员)
//! - [`states`] - 州 (交付目的地)
//! - [`arns`] - ARN 生命周期
//! - [`delivery`] - 按州批量送达
//! - [`dispatch`] - 派送批次与签名
//! - [`inventory`] - 空白卡库存
//! - [`reminders`] - 提醒
//! - [`reports`] - 报表

pub mod arns;
pub mod auth;
pub mod delivery;
pub mod dispatch;
pub mod files;
pub mod health;
pub mod inventory;
pub mod reminders;
pub mod reports;
pub mod states;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(states::router())
        .merge(arns::router())
        .merge(delivery::router())
        .merge(dispatch::router())
        .merge(inventory::router())
        .merge(reminders::router())
        .merge(reports::router())
}

/// 请求体上限：base64 编码后的文件 (4/3 膨胀) 加 JSON 其余字段
fn request_body_limit(max_artifact_bytes: usize) -> usize {
    max_artifact_bytes.saturating_mul(4) / 3 + 64 * 1024
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: ServerState) -> Router {
    let body_limit = request_body_limit(state.config.max_artifact_bytes);
    build_router()
        // JWT 认证中间件，require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request))
}

#[cfg(test)]
pub(crate) mod test_client {
    //! 路由测试辅助：在内存数据库上构建完整应用并发送请求

    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use shared::models::Role;

    use crate::core::ServerState;
    use crate::test_support::seed_account;

    pub struct TestApp {
        pub state: ServerState,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let pool = crate::db::test_pool().await;
            let state = ServerState::for_tests(pool, dir.path());
            Self { state, _dir: dir }
        }

        /// 创建账户并签发令牌
        pub async fn token(&self, username: &str, role: Role) -> String {
            let user = seed_account(&self.state.pool, username, "password", role).await;
            self.state.jwt_service.generate_token(&user).unwrap()
        }

        pub async fn request(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = super::build_app(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }
    }
}
