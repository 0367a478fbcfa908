//! Provisioning configuration.

/// Configuration for credential provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// RSA modulus size for validator keys (default: 2048).
    pub rsa_key_bits: usize,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self { rsa_key_bits: 2048 }
    }
}
