//! Data models
//!
//! Shared between the server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps Unix millis.

pub mod arn;
pub mod audit;
pub mod delivery;
pub mod dispatch;
pub mod inventory;
pub mod jurisdiction;
pub mod reminder;
pub mod report;
pub mod user;

// Re-exports
pub use arn::*;
pub use audit::*;
pub use delivery::*;
pub use dispatch::*;
pub use inventory::*;
pub use jurisdiction::*;
pub use reminder::*;
pub use report::*;
pub use user::*;
