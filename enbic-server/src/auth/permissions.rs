//! 角色权限
//!
//! 每个引擎操作都接收显式的 [`Actor`]，并在任何写入之前调用 [`Actor::require`]。
//! `admin` 通过所有检查；`supervisor` 只读。

use shared::models::Role;
use shared::{AppError, AppResult, ErrorCode};

use crate::security_log;

/// ARN 录入/流转、派送批次管理、申请审批
pub const OPERATOR: &[Role] = &[Role::Operator];
/// 现场人员：入库、自提、库存记账、提醒处理
pub const FIELD_STAFF: &[Role] = &[Role::Operator, Role::Officer];
/// 仅 officer (签收方)
pub const OFFICER: &[Role] = &[Role::Officer];
/// 仅管理员
pub const ADMIN: &[Role] = &[];

/// 执行操作的用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 库存分区：officer 为自己的库存，其他角色为中央库 (None)
    pub fn partition(&self) -> Option<i64> {
        match self.role {
            Role::Officer => Some(self.id),
            _ => None,
        }
    }

    /// 检查角色是否允许执行 `operation`
    pub fn require(&self, operation: &str, allowed: &[Role]) -> AppResult<()> {
        if self.is_admin() || allowed.contains(&self.role) {
            return Ok(());
        }

        security_log!(
            "WARN",
            "permission_denied",
            user_id = self.id,
            username = self.name.clone(),
            role = self.role.as_str(),
            operation = operation
        );

        let code = if allowed.is_empty() {
            ErrorCode::AdminRequired
        } else {
            ErrorCode::RoleRequired
        };
        let required: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(AppError::with_message(
            code,
            format!("Role {} is not permitted to {}", self.role, operation),
        )
        .with_detail("operation", operation)
        .with_detail("required", required))
    }
}
