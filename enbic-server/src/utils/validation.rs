//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use super::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// ARN identifiers
pub const MAX_ARN_LEN: usize = 64;

/// Entity names: jurisdictions, people, batch ids
pub const MAX_NAME_LEN: usize = 200;

/// Notes, reasons, references
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, collector id, document number
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            shared::ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Trim and validate a required string, returning the trimmed value.
pub fn required_trimmed(value: &str, field: &str, max_len: usize) -> AppResult<String> {
    let trimmed = value.trim();
    validate_required_text(trimmed, field, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim an optional string; blank becomes `None`.
pub fn optional_trimmed(value: Option<&str>, field: &str, max_len: usize) -> AppResult<Option<String>> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty());
    validate_optional_text(trimmed, field, max_len)?;
    Ok(trimmed.map(str::to_string))
}

/// Validate a strictly positive quantity.
pub fn validate_positive_qty(qty: i64, field: &str) -> AppResult<()> {
    if qty <= 0 {
        return Err(AppError::with_message(
            shared::ErrorCode::InvalidQuantity,
            format!("{field} must be greater than 0"),
        )
        .with_detail("field", field)
        .with_detail("value", qty));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_required_trimmed() {
        assert_eq!(required_trimmed("  ARN-1 ", "arn", MAX_ARN_LEN).unwrap(), "ARN-1");
        let err = required_trimmed("   ", "arn", MAX_ARN_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(required_trimmed(&"x".repeat(65), "arn", MAX_ARN_LEN).is_err());
    }

    #[test]
    fn test_optional_trimmed_blank_is_none() {
        assert_eq!(optional_trimmed(Some("  "), "notes", MAX_NOTE_LEN).unwrap(), None);
        assert_eq!(
            optional_trimmed(Some(" hi "), "notes", MAX_NOTE_LEN).unwrap(),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_positive_qty() {
        assert!(validate_positive_qty(1, "qty").is_ok());
        assert_eq!(
            validate_positive_qty(0, "qty").unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
    }
}
