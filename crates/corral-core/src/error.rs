//! Error types for the corral service.

use thiserror::Error;

/// Stable machine-readable reason attached to a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// A required field was absent from the request.
    MissingField,
    /// The organization name failed the identifier rules.
    InvalidName,
    /// The full name was empty or malformed.
    InvalidFullName,
    /// The payload could not be interpreted at all.
    MalformedPayload,
}

impl ValidationKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidName => "invalid_name",
            Self::InvalidFullName => "invalid_full_name",
            Self::MalformedPayload => "malformed_payload",
        }
    }
}

#[derive(Debug, Error)]
pub enum CorralError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation {
        kind: ValidationKind,
        message: String,
    },

    /// The requested change targets something that can never be changed
    /// again, such as a key that was issued exactly once.
    #[error("{message}")]
    Gone { message: String },

    /// A freshly generated identifier was already taken at commit time.
    #[error("Identifier collision on {id}")]
    IdentifierCollision { id: String },

    #[error("Search index unavailable: {0}")]
    IndexBackendUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CorralError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Whether the error is a client mistake rather than a service fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::Validation { .. }
                | Self::Gone { .. }
        )
    }
}

pub type CorralResult<T> = Result<T, CorralError>;
