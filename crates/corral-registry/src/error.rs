//! Identifier validation errors.

use corral_core::error::{CorralError, ValidationKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{0}' missing")]
    MissingField(&'static str),

    #[error("Invalid organization name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Invalid full name: {0}")]
    InvalidFullName(&'static str),
}

impl From<ValidationError> for CorralError {
    fn from(err: ValidationError) -> Self {
        let kind = match err {
            ValidationError::MissingField(_) => ValidationKind::MissingField,
            ValidationError::InvalidName { .. } => ValidationKind::InvalidName,
            ValidationError::InvalidFullName(_) => ValidationKind::InvalidFullName,
        };
        CorralError::validation(kind, err.to_string())
    }
}
