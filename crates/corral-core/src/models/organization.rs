//! Organization domain model.
//!
//! Organizations are the tenant namespaces of the platform. Each one owns
//! its nodes, roles, environments, data bags and clients, and gets a
//! validator client identity provisioned at creation time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used when rendering `assigned_at` to clients,
/// e.g. `2013-07-03 17:05:01 +0000`.
pub const ASSIGNED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A live organization as persisted by the registry.
///
/// The validator private key is deliberately absent: it is handed out once
/// through [`CreatedOrganization`] and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique short name used in URLs (e.g. `acme`).
    pub name: String,
    /// Human-readable display name.
    pub full_name: String,
    /// 32-character hex identifier, assigned once.
    pub guid: String,
    /// Optional classification tag (e.g. `Business`).
    pub org_type: Option<String>,
    /// Name of the privileged validator client, always `<name>-validator`
    /// as of creation.
    pub validator_client_name: String,
    /// PEM-encoded public half of the validator keypair.
    pub validator_public_key: String,
    /// Hex SHA-256 fingerprint of the validator public key.
    pub validator_key_fingerprint: String,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// `assigned_at` rendered as `YYYY-MM-DD HH:MM:SS ±TTTT`.
    pub fn assigned_at_display(&self) -> String {
        self.assigned_at.format(ASSIGNED_AT_FORMAT).to_string()
    }
}

/// Derive the validator client name for an organization.
pub fn validator_client_name(org_name: &str) -> String {
    format!("{org_name}-validator")
}

/// Fields needed to insert a new organization record.
///
/// Built by the registry after validation and credential provisioning.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub full_name: String,
    pub guid: String,
    pub org_type: Option<String>,
    pub validator_client_name: String,
    pub validator_public_key: String,
    pub validator_key_fingerprint: String,
}

/// Fields that can be changed on an existing organization in one write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOrganization {
    /// New unique name. Renames swap the unique key atomically.
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub org_type: Option<String>,
}

impl UpdateOrganization {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.full_name.is_none() && self.org_type.is_none()
    }
}

/// A validator private key in PEM form.
///
/// Not `Clone` and not `Serialize`: the only way to get the PEM out is to
/// consume the value, which the response layer does exactly once.
pub struct IssuedPrivateKey(String);

impl IssuedPrivateKey {
    pub fn new(pem: String) -> Self {
        Self(pem)
    }

    pub fn into_pem(self) -> String {
        self.0
    }
}

impl fmt::Debug for IssuedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IssuedPrivateKey(<redacted>)")
    }
}

/// Result of a successful create: the stored record plus the one-time key.
#[derive(Debug)]
pub struct CreatedOrganization {
    pub organization: Organization,
    pub private_key: IssuedPrivateKey,
}
