//! 提醒引擎
//!
//! 提醒完全由 ARN 当前状态派生，可重复、可并发生成：
//!
//! | 类型 | 条件 |
//! |---|---|
//! | `pending_capture` | ARN 处于 Awaiting Capture |
//! | `pending_personalization` | ARN 处于 Submitted to Personalization |
//! | `state_delivery_threshold` | 辖区内 Pending Delivery 数量 ≥ 阈值 |
//!
//! 生成时机：启动时、按固定间隔、以及每次 ARN 创建/状态变更后 (经 [`ReminderTrigger`])。

pub mod engine;
pub mod worker;

pub use engine::{generate, list_unresolved, resolve};
pub use worker::{ReminderTrigger, ReminderWorker};

/// 默认辖区提醒阈值
pub const DEFAULT_STATE_THRESHOLD: i64 = 3;
