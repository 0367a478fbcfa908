//! Identifier Validator.
//!
//! Pure checks applied identically on create and rename. Nothing here
//! touches storage.

use crate::error::ValidationError;

/// Longest accepted organization name.
pub const MAX_NAME_LEN: usize = 255;

/// Longest accepted full name.
pub const MAX_FULL_NAME_LEN: usize = 1023;

/// Check an organization name: ASCII letters, digits and hyphens only.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name is too long"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("only letters, digits and '-' are allowed"));
    }
    Ok(())
}

/// Check a display name: non-blank and bounded.
pub fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    if full_name.trim().is_empty() {
        return Err(ValidationError::InvalidFullName("full name must not be blank"));
    }
    if full_name.len() > MAX_FULL_NAME_LEN {
        return Err(ValidationError::InvalidFullName("full name is too long"));
    }
    if full_name.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFullName(
            "full name must not contain control characters",
        ));
    }
    Ok(())
}

/// Unwrap a required request field.
pub fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}
