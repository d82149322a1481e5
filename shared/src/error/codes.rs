//! Unified error codes for the ENBIC tracking server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: ARN lifecycle errors
//! - 4xxx: Dispatch errors
//! - 5xxx: Inventory errors
//! - 6xxx: Reminder errors
//! - 7xxx: Artifact errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: ARN ====================
    /// ARN not found
    ArnNotFound = 3001,
    /// ARN already exists
    ArnAlreadyExists = 3002,
    /// Status change is not an edge of the transition graph
    InvalidTransition = 3003,
    /// Operation not permitted in the ARN's current status
    InvalidArnState = 3004,
    /// Jurisdiction not found
    StateNotFound = 3005,
    /// Jurisdiction already exists
    StateAlreadyExists = 3006,
    /// Jurisdiction still referenced by ARNs
    StateInUse = 3007,

    // ==================== 4xxx: Dispatch ====================
    /// Dispatch batch not found
    BatchNotFound = 4001,
    /// Dispatch batch id already used
    BatchAlreadyExists = 4002,
    /// Operator and officer signatures are both required
    SignaturesMissing = 4003,
    /// Signature slot already filled
    SignatureAlreadyRecorded = 4004,
    /// Batch already delivered
    BatchDelivered = 4005,

    // ==================== 5xxx: Inventory ====================
    /// Balance is lower than the requested quantity
    InsufficientStock = 5001,
    /// Blank card request not found
    RequestNotFound = 5002,
    /// Blank card request already decided
    RequestAlreadyDecided = 5003,
    /// Blank card request has no approved quantity
    RequestNotApproved = 5004,
    /// Issue note not found
    IssueNoteNotFound = 5005,
    /// Issue note already completed
    IssueNoteCompleted = 5006,
    /// Quantity out of range
    InvalidQuantity = 5007,

    // ==================== 6xxx: Reminder ====================
    /// Reminder not found
    ReminderNotFound = 6001,

    // ==================== 7xxx: Artifact ====================
    /// Embedded file payload is malformed
    InvalidFileData = 7001,
    /// Embedded file payload exceeds the size limit
    FileTooLarge = 7002,
    /// Stored artifact not found
    FileNotFound = 7003,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already taken
    UsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Artifact storage error
    StorageError = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::AccountDisabled => "Account has been disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Required role missing",
            ErrorCode::AdminRequired => "Admin role required",

            // ARN
            ErrorCode::ArnNotFound => "ARN not found",
            ErrorCode::ArnAlreadyExists => "ARN already exists",
            ErrorCode::InvalidTransition => "Invalid status transition",
            ErrorCode::InvalidArnState => "Operation not allowed in current ARN status",
            ErrorCode::StateNotFound => "State not found",
            ErrorCode::StateAlreadyExists => "State already exists",
            ErrorCode::StateInUse => "State is referenced by ARNs",

            // Dispatch
            ErrorCode::BatchNotFound => "Dispatch batch not found",
            ErrorCode::BatchAlreadyExists => "Dispatch batch already exists",
            ErrorCode::SignaturesMissing => "Both operator and officer signatures are required",
            ErrorCode::SignatureAlreadyRecorded => "Signature already recorded",
            ErrorCode::BatchDelivered => "Dispatch batch already delivered",

            // Inventory
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::RequestNotFound => "Blank card request not found",
            ErrorCode::RequestAlreadyDecided => "Blank card request already decided",
            ErrorCode::RequestNotApproved => "Blank card request has no approved quantity",
            ErrorCode::IssueNoteNotFound => "Issue note not found",
            ErrorCode::IssueNoteCompleted => "Issue note already completed",
            ErrorCode::InvalidQuantity => "Invalid quantity",

            // Reminder
            ErrorCode::ReminderNotFound => "Reminder not found",

            // Artifact
            ErrorCode::InvalidFileData => "Invalid file data",
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::FileNotFound => "File not found",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "Storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // ARN
            3001 => Ok(ErrorCode::ArnNotFound),
            3002 => Ok(ErrorCode::ArnAlreadyExists),
            3003 => Ok(ErrorCode::InvalidTransition),
            3004 => Ok(ErrorCode::InvalidArnState),
            3005 => Ok(ErrorCode::StateNotFound),
            3006 => Ok(ErrorCode::StateAlreadyExists),
            3007 => Ok(ErrorCode::StateInUse),

            // Dispatch
            4001 => Ok(ErrorCode::BatchNotFound),
            4002 => Ok(ErrorCode::BatchAlreadyExists),
            4003 => Ok(ErrorCode::SignaturesMissing),
            4004 => Ok(ErrorCode::SignatureAlreadyRecorded),
            4005 => Ok(ErrorCode::BatchDelivered),

            // Inventory
            5001 => Ok(ErrorCode::InsufficientStock),
            5002 => Ok(ErrorCode::RequestNotFound),
            5003 => Ok(ErrorCode::RequestAlreadyDecided),
            5004 => Ok(ErrorCode::RequestNotApproved),
            5005 => Ok(ErrorCode::IssueNoteNotFound),
            5006 => Ok(ErrorCode::IssueNoteCompleted),
            5007 => Ok(ErrorCode::InvalidQuantity),

            // Reminder
            6001 => Ok(ErrorCode::ReminderNotFound),

            // Artifact
            7001 => Ok(ErrorCode::InvalidFileData),
            7002 => Ok(ErrorCode::FileTooLarge),
            7003 => Ok(ErrorCode::FileNotFound),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
