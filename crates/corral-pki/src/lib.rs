//! corral PKI: credential provisioning for new organizations.
//!
//! Generates the organization guid, the validator client's RSA keypair
//! and the validator client name. The private key leaves this crate only
//! inside an `IssuedPrivateKey`; what gets stored is the public key and its
//! fingerprint.

pub mod config;
pub mod error;
pub mod keys;
pub mod provisioner;

pub use config::ProvisionerConfig;
pub use error::ProvisionError;
pub use provisioner::RsaProvisioner;
