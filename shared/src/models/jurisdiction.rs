//! Jurisdiction Model (交付目的地 "State")

use serde::{Deserialize, Serialize};

/// Jurisdiction row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Jurisdiction {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Create jurisdiction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionCreate {
    pub name: String,
}
