//! 测试夹具

use shared::models::{ArnStatus, Role, User};
use sqlx::SqlitePool;

use crate::auth::Actor;
use crate::db::repository;

pub fn operator() -> Actor {
    Actor::new(900, "operator", Role::Operator)
}

pub fn admin() -> Actor {
    Actor::new(901, "admin", Role::Admin)
}

pub fn supervisor() -> Actor {
    Actor::new(902, "supervisor", Role::Supervisor)
}

/// 写入 users 表的账户 (库存分区与申请需要真实外键)
pub async fn seed_user(pool: &SqlitePool, username: &str, role: Role) -> Actor {
    let user = repository::user::insert(pool, username, username, "$argon2id$test", role, 0)
        .await
        .unwrap();
    Actor::new(user.id, user.username, user.role)
}

pub async fn officer(pool: &SqlitePool, username: &str) -> Actor {
    seed_user(pool, username, Role::Officer).await
}

pub async fn seed_state(pool: &SqlitePool, name: &str) {
    repository::jurisdiction::create(pool, name).await.unwrap();
}

/// 直接写入指定状态，跳过转换校验
pub async fn seed_arn(pool: &SqlitePool, arn: &str, state: &str, status: ArnStatus) {
    repository::arn::insert(pool, arn, state, None, 1_000)
        .await
        .unwrap();
    sqlx::query("UPDATE arns SET status = ? WHERE arn = ?")
        .bind(status)
        .bind(arn)
        .execute(pool)
        .await
        .unwrap();
}

/// 把 ARN 的创建时间改到 `days` 天前
pub async fn age_arn(pool: &SqlitePool, arn: &str, days: i64) {
    let created_at = shared::util::now_millis() - days * 86_400_000;
    sqlx::query("UPDATE arns SET created_at = ? WHERE arn = ?")
        .bind(created_at)
        .bind(arn)
        .execute(pool)
        .await
        .unwrap();
}

/// 带真实密码哈希的账户 (登录接口测试)
pub async fn seed_account(pool: &SqlitePool, username: &str, password: &str, role: Role) -> User {
    let hash = crate::auth::password::hash_password(password).unwrap();
    repository::user::insert(pool, username, username, &hash, role, 0)
        .await
        .unwrap()
}
