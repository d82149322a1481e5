//! Inventory Models (空白卡库存台账)
//!
//! 余额不存储，始终由 `stock_movements` 的带符号数量求和得出。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Movement type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum MovementType {
    Received,
    Issued,
    Adjustment,
    Damaged,
    Lost,
    ReceivedFromIssue,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Received => "received",
            MovementType::Issued => "issued",
            MovementType::Adjustment => "adjustment",
            MovementType::Damaged => "damaged",
            MovementType::Lost => "lost",
            MovementType::ReceivedFromIssue => "received_from_issue",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock movement (append-only ledger line)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub movement_type: MovementType,
    /// Signed quantity
    pub qty: i64,
    pub reference: Option<String>,
    pub related_request_id: Option<i64>,
    pub operator: Option<String>,
    /// `None` = central pool
    pub user_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Receive stock payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReceive {
    pub qty: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Issue to personalization payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueToPersonalization {
    pub qty: i64,
    pub issued_to: Option<String>,
    pub reference: Option<String>,
}

/// Adjustment kinds accepted by `adjust`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Adjustment,
    Damaged,
    Lost,
}

impl From<AdjustmentKind> for MovementType {
    fn from(kind: AdjustmentKind) -> Self {
        match kind {
            AdjustmentKind::Adjustment => MovementType::Adjustment,
            AdjustmentKind::Damaged => MovementType::Damaged,
            AdjustmentKind::Lost => MovementType::Lost,
        }
    }
}

/// Adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub qty: i64,
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Blank card request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RequestStatus {
    Pending,
    Approved,
    PartiallyApproved,
    Rejected,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::PartiallyApproved => "partially_approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Blank card request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BlankCardRequest {
    pub id: i64,
    pub requester_id: i64,
    pub quantity: i64,
    pub reason: Option<String>,
    pub needed_by: Option<String>,
    pub status: RequestStatus,
    pub approved_qty: i64,
    pub approver_id: Option<i64>,
    pub decision_note: Option<String>,
    pub created_at: i64,
    pub decided_at: Option<i64>,
}

/// Blank card request with requester name (list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BlankCardRequestView {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub request: BlankCardRequest,
    pub requester_name: Option<String>,
}

/// Create request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankCardRequestCreate {
    pub quantity: i64,
    pub reason: Option<String>,
    pub needed_by: Option<String>,
}

/// Decision action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Partial,
    Reject,
}

/// Decision payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDecision {
    pub action: DecisionAction,
    pub approved_qty: Option<i64>,
    pub decision_note: Option<String>,
}

/// Issue note status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum IssueNoteStatus {
    PendingSignatures,
    Completed,
}

/// Issue note (physical handover artifact)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct IssueNote {
    pub id: i64,
    pub request_id: i64,
    pub quantity: i64,
    pub issuer_name: Option<String>,
    pub issuer_signed_at: Option<i64>,
    pub receiver_name: Option<String>,
    pub receiver_signed_at: Option<i64>,
    pub issue_note_path: Option<String>,
    pub status: IssueNoteStatus,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

/// Issue note signature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSigner {
    Issuer,
    Receiver,
}

/// Issue note sign payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSignRequest {
    pub signer: IssueSigner,
    pub name: String,
    #[serde(default, alias = "fileData")]
    pub file_data: Option<String>,
}

/// Reconciliation report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub opening: i64,
    pub received: i64,
    pub issued: i64,
    pub damaged: i64,
    pub lost: i64,
    pub adjustments: i64,
    pub expected: i64,
}

/// Reconciliation query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// `central` or an officer user id
    pub partition: Option<String>,
}

/// Low stock check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStock {
    pub total: i64,
    pub threshold: i64,
    pub low: bool,
}

/// Threshold update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    pub threshold: i64,
}

/// Officer store balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OfficerStock {
    pub user_id: i64,
    pub username: String,
    pub balance: i64,
}

/// Balance view (shape depends on the caller's role)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BalanceView {
    Overview {
        central_stock: i64,
        officer_stocks: Vec<OfficerStock>,
    },
    Own {
        total: i64,
    },
}

/// Ledger listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_serializes_type_field() {
        let movement = StockMovement {
            id: 1,
            movement_type: MovementType::ReceivedFromIssue,
            qty: 20,
            reference: None,
            related_request_id: Some(3),
            operator: Some("ada".into()),
            user_id: Some(7),
            notes: None,
            created_at: 0,
        };
        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "received_from_issue");
        assert_eq!(json["qty"], 20);
    }

    #[test]
    fn test_balance_view_shapes() {
        let own = serde_json::to_value(BalanceView::Own { total: 5 }).unwrap();
        assert_eq!(own, serde_json::json!({"total": 5}));

        let overview = serde_json::to_value(BalanceView::Overview {
            central_stock: 10,
            officer_stocks: vec![],
        })
        .unwrap();
        assert_eq!(overview["central_stock"], 10);
        assert!(overview["officer_stocks"].is_array());
    }

    #[test]
    fn test_adjust_payload() {
        let req: StockAdjust =
            serde_json::from_str(r#"{"qty":-3,"type":"damaged","reference":"R1"}"#).unwrap();
        assert_eq!(req.kind, AdjustmentKind::Damaged);
        assert_eq!(MovementType::from(req.kind), MovementType::Damaged);
    }
}
