//! Authentication Handlers
//!
//! Handles login, logout and the current-user lookup

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::{ApiResponse, AppError, ErrorCode};

use crate::audit::{AuditAction, AuditRecord};
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;

/// Fixed delay applied to every login attempt
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = req.username.trim().to_string();
    let found = user::find_by_username(&state.pool, &username).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match found {
        Some(account) if verify_password(&req.password, &account.password_hash) => account,
        found => {
            let reason = if found.is_some() {
                "invalid_password"
            } else {
                "user_not_found"
            };
            state
                .audit
                .log(AuditRecord::new(AuditAction::LoginFailed, username.clone()).new_value(reason))
                .await;
            security_log!("WARN", "login_failed", username = username.clone(), reason = reason);
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled", username = username.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let token = state
        .jwt_service
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    state
        .audit
        .log(AuditRecord::new(AuditAction::LoginSuccess, account.username.clone()))
        .await;
    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = %account.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&account),
    }))
}

/// Get current user info
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(Json(UserInfo::from(&account)))
}

/// Logout handler (tokens are stateless; only the audit entry is written)
pub async fn logout(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> Json<ApiResponse<()>> {
    state
        .audit
        .log(AuditRecord::new(AuditAction::Logout, current.username.clone()))
        .await;
    tracing::info!(user_id = current.id, username = %current.username, "User logged out");
    Json(ApiResponse::ok())
}
