//! Credential provisioning contract.
//!
//! Implemented by `corral-pki`. Provisioning is CPU-bound and synchronous;
//! async callers are expected to move it onto a blocking thread.

use crate::error::CorralResult;
use crate::models::organization::IssuedPrivateKey;

/// Everything generated for a new organization before it is committed.
#[derive(Debug)]
pub struct ProvisionedCredentials {
    pub guid: String,
    pub validator_client_name: String,
    /// PEM-encoded public key (SubjectPublicKeyInfo).
    pub public_key_pem: String,
    /// Hex SHA-256 of the DER public key.
    pub public_key_fingerprint: String,
    /// PKCS#1 PEM private key, surfaced to the caller once.
    pub private_key: IssuedPrivateKey,
}

pub trait CredentialProvisioner: Send + Sync + 'static {
    /// Generate guid, validator keypair and validator client name.
    fn provision(&self, org_name: &str) -> CorralResult<ProvisionedCredentials>;

    /// Generate a fresh guid on its own, used when a commit finds the
    /// first one already taken.
    fn generate_guid(&self) -> String;
}
