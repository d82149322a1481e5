//! 辖区 (State) 管理

use shared::models::Jurisdiction;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::audit::{AuditAction, AuditRecord};
use crate::auth::Actor;
use crate::auth::permissions::{ADMIN, OPERATOR};
use crate::db::repository::{self, RepoError};
use crate::effects::{Effects, Outcome};
use crate::utils::validation::{MAX_NAME_LEN, required_trimmed};

pub async fn list_states(pool: &SqlitePool) -> AppResult<Vec<Jurisdiction>> {
    Ok(repository::jurisdiction::find_all(pool).await?)
}

pub async fn create_state(
    pool: &SqlitePool,
    name: &str,
    actor: &Actor,
) -> AppResult<Outcome<Jurisdiction>> {
    actor.require("create state", OPERATOR)?;
    let name = required_trimmed(name, "name", MAX_NAME_LEN)?;

    let state = repository::jurisdiction::create(pool, &name)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::StateAlreadyExists,
                format!("State {name} already exists"),
            )
            .with_detail("state", name.clone()),
            other => other.into(),
        })?;

    tracing::info!(state = %state.name, operator = %actor.name, "State created");
    let record = AuditRecord::new(AuditAction::StateCreated, &actor.name).new_value(&state.name);
    Ok(Outcome::new(state, Effects::new().audit(record)))
}

/// 删除辖区；仍被 ARN 或派送批次引用时拒绝
pub async fn delete_state(pool: &SqlitePool, id: i64, actor: &Actor) -> AppResult<Outcome<()>> {
    actor.require("delete state", ADMIN)?;

    let state = repository::jurisdiction::find_by_id(pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::StateNotFound, format!("State {id} not found"))
                .with_detail("id", id)
        })?;

    let in_use = |name: &str| {
        AppError::with_message(
            ErrorCode::StateInUse,
            format!("State {name} is still referenced and cannot be deleted"),
        )
        .with_detail("state", name)
    };

    if repository::arn::count_in_state(pool, &state.name).await? > 0 {
        return Err(in_use(&state.name));
    }

    // 派送批次等其它引用由外键兜底
    match repository::jurisdiction::delete(pool, id).await {
        Ok(_) => {}
        Err(RepoError::Validation(_)) => return Err(in_use(&state.name)),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(state = %state.name, operator = %actor.name, "State deleted");
    let record = AuditRecord::new(AuditAction::StateDeleted, &actor.name).old(&state.name);
    Ok(Outcome::new((), Effects::new().audit(record)))
}
