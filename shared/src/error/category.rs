//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: ARN lifecycle errors
/// - 4xxx: Dispatch errors
/// - 5xxx: Inventory errors
/// - 6xxx: Reminder errors
/// - 7xxx: Artifact errors
/// - 8xxx: User errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// ARN lifecycle errors (3xxx)
    Arn,
    /// Dispatch errors (4xxx)
    Dispatch,
    /// Inventory errors (5xxx)
    Inventory,
    /// Reminder errors (6xxx)
    Reminder,
    /// Artifact errors (7xxx)
    Artifact,
    /// User errors (8xxx)
    User,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Arn,
            4000..5000 => Self::Dispatch,
            5000..6000 => Self::Inventory,
            6000..7000 => Self::Reminder,
            7000..8000 => Self::Artifact,
            8000..9000 => Self::User,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Arn => "arn",
            Self::Dispatch => "dispatch",
            Self::Inventory => "inventory",
            Self::Reminder => "reminder",
            Self::Artifact => "artifact",
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
