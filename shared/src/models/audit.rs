//! Audit Log Model

use serde::{Deserialize, Serialize};

/// Append-only audit row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub id: i64,
    pub arn: Option<String>,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub timestamp: i64,
    pub operator: String,
}
