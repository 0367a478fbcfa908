//! RSA-backed credential provisioner.

use corral_core::error::CorralResult;
use corral_core::models::organization::{IssuedPrivateKey, validator_client_name};
use corral_core::provisioning::{CredentialProvisioner, ProvisionedCredentials};
use tracing::debug;

use crate::config::ProvisionerConfig;
use crate::keys;

/// Provisions organization credentials with freshly generated RSA keys.
///
/// Holds only configuration; every call draws its own randomness.
#[derive(Debug, Clone, Default)]
pub struct RsaProvisioner {
    config: ProvisionerConfig,
}

impl RsaProvisioner {
    pub fn new(config: ProvisionerConfig) -> Self {
        Self { config }
    }
}

impl CredentialProvisioner for RsaProvisioner {
    fn provision(&self, org_name: &str) -> CorralResult<ProvisionedCredentials> {
        let pair = keys::generate_keypair(self.config.rsa_key_bits)?;
        let guid = keys::generate_guid();

        debug!(
            organization = %org_name,
            guid = %guid,
            fingerprint = %pair.fingerprint,
            "Provisioned validator credentials"
        );

        Ok(ProvisionedCredentials {
            guid,
            validator_client_name: validator_client_name(org_name),
            public_key_pem: pair.public_key_pem,
            public_key_fingerprint: pair.fingerprint,
            private_key: IssuedPrivateKey::new(pair.private_key_pem),
        })
    }

    fn generate_guid(&self) -> String {
        keys::generate_guid()
    }
}
