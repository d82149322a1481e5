//! Dispatch Batch Model (交付批次 + 双方签字)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch batch status
///
/// `prepared → ready_for_dispatch → dispatched → delivered`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DispatchStatus {
    Prepared,
    ReadyForDispatch,
    Dispatched,
    Delivered,
}

impl DispatchStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Prepared => "prepared",
            DispatchStatus::ReadyForDispatch => "ready_for_dispatch",
            DispatchStatus::Dispatched => "dispatched",
            DispatchStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature slot on a dispatch batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchSigner {
    Operator,
    Officer,
}

impl DispatchSigner {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DispatchSigner::Operator => "operator",
            DispatchSigner::Officer => "officer",
        }
    }
}

/// Dispatch batch row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DispatchBatch {
    pub id: i64,
    pub batch_id: String,
    pub state: String,
    pub card_count: i64,
    /// Single-ARN scope; `None` covers every pending ARN of `state`
    pub batch_arn: Option<String>,
    pub operator_name: Option<String>,
    pub operator_signed_at: Option<i64>,
    pub officer_name: Option<String>,
    pub officer_signed_at: Option<i64>,
    pub delivery_note_path: Option<String>,
    pub confirmation_note_path: Option<String>,
    pub dispatched_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub status: DispatchStatus,
    pub created_by: Option<String>,
    pub created_at: i64,
}

impl DispatchBatch {
    /// 双方签字均已记录
    pub fn fully_signed(&self) -> bool {
        self.operator_name.is_some() && self.officer_name.is_some()
    }

    pub fn signer_name(&self, signer: DispatchSigner) -> Option<&str> {
        match signer {
            DispatchSigner::Operator => self.operator_name.as_deref(),
            DispatchSigner::Officer => self.officer_name.as_deref(),
        }
    }
}

/// Create batch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchBatchCreate {
    #[serde(alias = "batchId")]
    pub batch_id: String,
    pub state: String,
    #[serde(alias = "cardCount")]
    pub card_count: i64,
    #[serde(default, alias = "batchArn")]
    pub batch_arn: Option<String>,
}

/// Sign payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSignRequest {
    pub signer: DispatchSigner,
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    #[serde(default, alias = "fileData")]
    pub file_data: Option<String>,
    /// Required to replace an existing signature in the same slot
    #[serde(default)]
    pub overwrite: bool,
}

/// Confirmation note upload payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationUpload {
    #[serde(alias = "fileData")]
    pub file_data: String,
}

/// Result of a confirmation upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub batch: DispatchBatch,
    pub delivered_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&DispatchStatus::ReadyForDispatch).unwrap();
        assert_eq!(json, "\"ready_for_dispatch\"");
    }

    #[test]
    fn test_create_accepts_camel_case() {
        let req: DispatchBatchCreate =
            serde_json::from_str(r#"{"batchId":"B-1","state":"Lagos","cardCount":12}"#).unwrap();
        assert_eq!(req.batch_id, "B-1");
        assert_eq!(req.card_count, 12);
        assert!(req.batch_arn.is_none());
    }

    #[test]
    fn test_sign_request_defaults() {
        let req: DispatchSignRequest =
            serde_json::from_str(r#"{"signer":"officer","name":"Ada"}"#).unwrap();
        assert_eq!(req.signer, DispatchSigner::Officer);
        assert!(!req.overwrite);
        assert!(req.file_data.is_none());
    }
}
