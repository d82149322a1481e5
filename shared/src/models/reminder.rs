//! Reminder Model (待办提醒，由当前状态派生)

use serde::{Deserialize, Serialize};

use super::arn::ArnStatus;

/// Reminder type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ReminderType {
    PendingCapture,
    PendingPersonalization,
    StateDeliveryThreshold,
}

impl ReminderType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReminderType::PendingCapture => "pending_capture",
            ReminderType::PendingPersonalization => "pending_personalization",
            ReminderType::StateDeliveryThreshold => "state_delivery_threshold",
        }
    }
}

/// Reminder row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reminder {
    pub id: i64,
    /// `None` for jurisdiction-level reminders
    pub arn: Option<String>,
    /// Jurisdiction for `state_delivery_threshold` reminders
    pub state: Option<String>,
    pub reminder_type: ReminderType,
    pub message: String,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

/// Unresolved reminder with the ARN's current position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReminderView {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub reminder: Reminder,
    pub arn_state: Option<String>,
    pub arn_status: Option<ArnStatus>,
}

/// Generation summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateSummary {
    pub pending_capture: u64,
    pub pending_personalization: u64,
    pub state_delivery_threshold: u64,
}

impl GenerateSummary {
    pub fn created(&self) -> u64 {
        self.pending_capture + self.pending_personalization + self.state_delivery_threshold
    }
}

/// Resolve outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub success: bool,
    pub reminder: Reminder,
    /// Status the linked ARN advanced to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_to: Option<ArnStatus>,
}
