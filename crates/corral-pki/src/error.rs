//! Provisioning error types.

use corral_core::error::CorralError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key encoding failed: {0}")]
    Encoding(String),
}

impl From<ProvisionError> for CorralError {
    fn from(err: ProvisionError) -> Self {
        CorralError::Crypto(err.to_string())
    }
}
