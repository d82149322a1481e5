//! Delivery Models (批量交付记录)

use serde::{Deserialize, Serialize};

/// Delivery history row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryHistory {
    pub id: i64,
    pub state: String,
    pub delivery_date: i64,
    pub arn_count: i64,
    pub operator_notes: Option<String>,
    /// Set when produced by a dispatch confirmation upload
    pub batch_id: Option<String>,
}

/// Bulk delivery confirmation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfirmRequest {
    pub state: String,
    pub notes: Option<String>,
}

/// Bulk delivery confirmation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfirmResponse {
    pub success: bool,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pending delivery statistics per jurisdiction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryStat {
    pub state: String,
    pub pending_count: i64,
    /// Creation time of the oldest pending ARN
    pub oldest_pending: i64,
}
