//! 审计日志类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 审计动作
///
/// 存储为 SCREAMING_SNAKE_CASE 字符串 (如 `STATUS_UPDATED`)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // ═══ 系统 ═══
    SystemStartup,
    SystemShutdown,

    // ═══ 认证 ═══
    LoginSuccess,
    LoginFailed,
    Logout,
    UserCreated,

    // ═══ ARN 生命周期 ═══
    ArnCreated,
    StatusUpdated,
    DocumentNumberSet,
    BulkDelivered,
    StoreReceived,
    ShqCollected,
    StateCreated,
    StateDeleted,

    // ═══ 派送批次 ═══
    BatchCreated,
    BatchSigned,
    BatchReady,
    BatchDispatched,
    BatchDelivered,
    DeliveryNoteGenerated,

    // ═══ 库存 ═══
    StockReceived,
    StockIssued,
    StockAdjusted,
    RequestCreated,
    RequestDecided,
    IssueNoteGenerated,
    IssueNoteSigned,
    IssueNoteCompleted,
    ThresholdUpdated,

    // ═══ 提醒 ═══
    ReminderResolved,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SystemStartup => "SYSTEM_STARTUP",
            AuditAction::SystemShutdown => "SYSTEM_SHUTDOWN",
            AuditAction::LoginSuccess => "LOGIN_SUCCESS",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::Logout => "LOGOUT",
            AuditAction::UserCreated => "USER_CREATED",
            AuditAction::ArnCreated => "ARN_CREATED",
            AuditAction::StatusUpdated => "STATUS_UPDATED",
            AuditAction::DocumentNumberSet => "DOCUMENT_NUMBER_SET",
            AuditAction::BulkDelivered => "BULK_DELIVERED",
            AuditAction::StoreReceived => "STORE_RECEIVED",
            AuditAction::ShqCollected => "SHQ_COLLECTED",
            AuditAction::StateCreated => "STATE_CREATED",
            AuditAction::StateDeleted => "STATE_DELETED",
            AuditAction::BatchCreated => "BATCH_CREATED",
            AuditAction::BatchSigned => "BATCH_SIGNED",
            AuditAction::BatchReady => "BATCH_READY",
            AuditAction::BatchDispatched => "BATCH_DISPATCHED",
            AuditAction::BatchDelivered => "BATCH_DELIVERED",
            AuditAction::DeliveryNoteGenerated => "DELIVERY_NOTE_GENERATED",
            AuditAction::StockReceived => "STOCK_RECEIVED",
            AuditAction::StockIssued => "STOCK_ISSUED",
            AuditAction::StockAdjusted => "STOCK_ADJUSTED",
            AuditAction::RequestCreated => "REQUEST_CREATED",
            AuditAction::RequestDecided => "REQUEST_DECIDED",
            AuditAction::IssueNoteGenerated => "ISSUE_NOTE_GENERATED",
            AuditAction::IssueNoteSigned => "ISSUE_NOTE_SIGNED",
            AuditAction::IssueNoteCompleted => "ISSUE_NOTE_COMPLETED",
            AuditAction::ThresholdUpdated => "THRESHOLD_UPDATED",
            AuditAction::ReminderResolved => "REMINDER_RESOLVED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条待写入的审计记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub arn: Option<String>,
    pub action: AuditAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub operator: String,
    pub timestamp: i64,
}

impl AuditRecord {
    pub fn new(action: AuditAction, operator: impl Into<String>) -> Self {
        Self {
            arn: None,
            action,
            old_value: None,
            new_value: None,
            operator: operator.into(),
            timestamp: shared::util::now_millis(),
        }
    }

    /// ARN 级记录
    pub fn for_arn(action: AuditAction, arn: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            arn: Some(arn.into()),
            ..Self::new(action, operator)
        }
    }

    pub fn old(mut self, value: impl Into<String>) -> Self {
        self.old_value = Some(value.into());
        self
    }

    pub fn new_value(mut self, value: impl Into<String>) -> Self {
        self.new_value = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_match_serde() {
        for action in [
            AuditAction::ArnCreated,
            AuditAction::StatusUpdated,
            AuditAction::BulkDelivered,
            AuditAction::ShqCollected,
            AuditAction::IssueNoteCompleted,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_record_builder() {
        let record = AuditRecord::for_arn(AuditAction::StatusUpdated, "ARN-1", "ada")
            .old("Awaiting Capture")
            .new_value("Submitted to Personalization");
        assert_eq!(record.arn.as_deref(), Some("ARN-1"));
        assert_eq!(record.old_value.as_deref(), Some("Awaiting Capture"));
        assert_eq!(record.operator, "ada");
    }
}
