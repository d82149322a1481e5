//! User Management Handlers

use axum::{Json, extract::State};
use shared::client::UserInfo;
use shared::models::UserCreate;
use shared::{AppError, AppResult, ErrorCode};

use crate::audit::{AuditAction, AuditRecord};
use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::auth::permissions::ADMIN;
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, optional_trimmed, required_trimmed,
};
use shared::util::now_millis;

const MIN_PASSWORD_LEN: usize = 6;

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserInfo>>> {
    let users = user::list(&state.pool).await?;
    Ok(Json(users.iter().map(UserInfo::from).collect()))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserInfo>> {
    let actor = current.actor();
    actor.require("create user", ADMIN)?;

    let username = required_trimmed(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    let display_name = optional_trimmed(payload.display_name.as_deref(), "display_name", MAX_NAME_LEN)?
        .unwrap_or_else(|| username.clone());
    if payload.password.len() < MIN_PASSWORD_LEN || payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!(
                "password must be between {} and {} characters",
                MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
            ),
        )
        .with_detail("field", "password"));
    }

    let hash = hash_password(&payload.password)?;
    let created = match user::insert(
        &state.pool,
        &username,
        &display_name,
        &hash,
        payload.role,
        now_millis(),
    )
    .await
    {
        Ok(created) => created,
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::with_message(
                ErrorCode::UsernameExists,
                format!("Username {} already exists", username),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    state
        .audit
        .log(
            AuditRecord::new(AuditAction::UserCreated, actor.name.clone()).new_value(format!(
                "User: {} (Role: {})",
                created.username,
                created.role.as_str()
            )),
        )
        .await;
    tracing::info!(username = %created.username, role = %created.role, "User created");

    Ok(Json(UserInfo::from(&created)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_client::TestApp;
    use http::StatusCode;
    use serde_json::json;
    use shared::models::Role;

    #[tokio::test]
    async fn test_admin_creates_user() {
        let app = TestApp::new().await;
        let admin = app.token("root", Role::Admin).await;

        let payload = json!({"username": " kano-officer ", "password": "secret1", "role": "officer"});
        let (status, body) = app
            .request("POST", "/api/users", Some(&admin), Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "kano-officer");
        assert_eq!(body["role"], "officer");

        let (status, _) = app
            .request("POST", "/api/users", Some(&admin), Some(payload))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, list) = app.request("GET", "/api/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_admin_rejected() {
        let app = TestApp::new().await;
        let operator = app.token("op", Role::Operator).await;
        let (status, _) = app
            .request(
                "POST",
                "/api/users",
                Some(&operator),
                Some(json!({"username": "x", "password": "secret1", "role": "admin"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let app = TestApp::new().await;
        let admin = app.token("root", Role::Admin).await;
        let (status, body) = app
            .request(
                "POST",
                "/api/users",
                Some(&admin),
                Some(json!({"username": "x", "password": "123", "role": "officer"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "password");
    }
}
