//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ArnNotFound
            | Self::StateNotFound
            | Self::BatchNotFound
            | Self::RequestNotFound
            | Self::IssueNoteNotFound
            | Self::ReminderNotFound
            | Self::FileNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ArnAlreadyExists
            | Self::StateAlreadyExists
            | Self::StateInUse
            | Self::BatchAlreadyExists
            | Self::SignatureAlreadyRecorded
            | Self::UsernameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 402 Payment Required (ledger sufficiency)
            Self::InsufficientStock => StatusCode::PAYMENT_REQUIRED,

            // 412 Precondition Failed
            Self::SignaturesMissing => StatusCode::PRECONDITION_FAILED,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation and state machine violations)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::ArnNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BatchNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ReminderNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::ArnAlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::BatchAlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::StateInUse.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_transition_is_bad_request() {
        assert_eq!(ErrorCode::InvalidTransition.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidQuantity.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ledger_and_protocol_statuses() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ErrorCode::SignaturesMissing.http_status(),
            StatusCode::PRECONDITION_FAILED
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(ErrorCode::NotAuthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
