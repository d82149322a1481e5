//! ARN Model (卡片生命周期记录)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ARN status
///
/// 存储与序列化均使用展示名 (`"Awaiting Capture"` 等)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum ArnStatus {
    #[serde(rename = "Awaiting Capture")]
    #[cfg_attr(feature = "db", sqlx(rename = "Awaiting Capture"))]
    AwaitingCapture,
    #[serde(rename = "Submitted to Personalization")]
    #[cfg_attr(feature = "db", sqlx(rename = "Submitted to Personalization"))]
    SubmittedToPersonalization,
    #[serde(rename = "Pending Delivery")]
    #[cfg_attr(feature = "db", sqlx(rename = "Pending Delivery"))]
    PendingDelivery,
    #[serde(rename = "Delivered")]
    #[cfg_attr(feature = "db", sqlx(rename = "Delivered"))]
    Delivered,
    #[serde(rename = "Collected at SHQ")]
    #[cfg_attr(feature = "db", sqlx(rename = "Collected at SHQ"))]
    CollectedAtShq,
    #[serde(rename = "Stored")]
    #[cfg_attr(feature = "db", sqlx(rename = "Stored"))]
    Stored,
}

impl ArnStatus {
    pub const ALL: [ArnStatus; 6] = [
        ArnStatus::AwaitingCapture,
        ArnStatus::SubmittedToPersonalization,
        ArnStatus::PendingDelivery,
        ArnStatus::Delivered,
        ArnStatus::CollectedAtShq,
        ArnStatus::Stored,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ArnStatus::AwaitingCapture => "Awaiting Capture",
            ArnStatus::SubmittedToPersonalization => "Submitted to Personalization",
            ArnStatus::PendingDelivery => "Pending Delivery",
            ArnStatus::Delivered => "Delivered",
            ArnStatus::CollectedAtShq => "Collected at SHQ",
            ArnStatus::Stored => "Stored",
        }
    }

    /// 终态：不再有出边
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ArnStatus::Delivered | ArnStatus::CollectedAtShq)
    }
}

impl Default for ArnStatus {
    fn default() -> Self {
        Self::AwaitingCapture
    }
}

impl fmt::Display for ArnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArnStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown ARN status: {}", s))
    }
}

/// ARN record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Arn {
    pub id: i64,
    pub arn: String,
    pub name: Option<String>,
    /// Jurisdiction name (references `states.name`)
    pub state: String,
    pub status: ArnStatus,
    pub created_at: i64,
    pub submitted_at: Option<i64>,
    pub pending_delivery_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub collected_at: Option<i64>,
    pub stored_at: Option<i64>,
    pub document_number: Option<String>,
    pub document_number_set_by: Option<String>,
    pub document_number_set_at: Option<i64>,
    pub delivery_note_path: Option<String>,
    pub collector_name: Option<String>,
    pub collector_id: Option<String>,
    pub collector_phone: Option<String>,
}

/// Create ARN payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArnCreate {
    pub arn: String,
    pub state: String,
    pub name: Option<String>,
}

/// Create ARN response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArnCreated {
    pub id: i64,
    pub arn: String,
    pub state: String,
    pub status: ArnStatus,
}

/// Status update payload
///
/// 保持字符串形式，未知状态在引擎中报告为非法迁移。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArnStatusUpdate {
    pub status: String,
}

/// Status update response (`success` 之外附带更新后的 ARN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArnStatusResponse {
    pub success: bool,
    pub arn: Arn,
}

/// Document number payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentNumberUpdate {
    #[serde(alias = "documentNumber")]
    pub document_number: String,
}

/// ARN list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArnQuery {
    pub state: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Store receipt payload (personalized cards arriving in store)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReceiptRequest {
    pub arns: Vec<String>,
    pub state: Option<String>,
}

/// SHQ pickup payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupRequest {
    pub arns: Vec<String>,
    pub collector_name: Option<String>,
    pub collector_id: Option<String>,
    pub phone: Option<String>,
}

/// Per-item result of a bulk ARN operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArnItemResult {
    pub arn: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ArnStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArnItemResult {
    pub fn ok(arn: impl Into<String>, status: ArnStatus) -> Self {
        Self {
            arn: arn.into(),
            success: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(arn: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            success: false,
            status: None,
            error: Some(error.into()),
        }
    }
}

/// Bulk ARN operation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkArnResponse {
    pub results: Vec<ArnItemResult>,
}

impl BulkArnResponse {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }
}
