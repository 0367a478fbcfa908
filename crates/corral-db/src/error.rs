//! Database-specific error types and conversions.

use corral_core::error::CorralError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    #[error("Unique constraint violated on {entity}: {id}")]
    UniqueViolation { entity: String, id: String },

    /// A record with the requested record id already exists.
    #[error("Record id already taken: {0}")]
    RecordExists(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),
}

impl DbError {
    /// Classify a failed statement's message.
    ///
    /// SurrealDB reports index and record clashes only through the error
    /// text, so this is where they become typed errors.
    pub(crate) fn from_statement(
        message: String,
        entity: &str,
        unique_key: &str,
        record_id: &str,
    ) -> Self {
        if message.contains("already contains") {
            DbError::UniqueViolation {
                entity: entity.to_string(),
                id: unique_key.to_string(),
            }
        } else if message.contains("already exists") {
            DbError::RecordExists(record_id.to_string())
        } else {
            DbError::Query(message)
        }
    }

    /// Write-write conflicts between concurrent transactions; safe to retry.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            DbError::Query(msg) => {
                msg.contains("can be retried") || msg.contains("read or write conflict")
            }
            DbError::Surreal(err) => {
                let msg = err.to_string();
                msg.contains("can be retried") || msg.contains("read or write conflict")
            }
            _ => false,
        }
    }
}

impl From<DbError> for CorralError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CorralError::NotFound { entity, id },
            DbError::UniqueViolation { entity, id } => CorralError::AlreadyExists { entity, id },
            DbError::RecordExists(id) => CorralError::IdentifierCollision { id },
            other => CorralError::Database(other.to_string()),
        }
    }
}
