//! Organization Registry: create, rename, update and delete transitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use corral_core::error::{CorralError, CorralResult};
use corral_core::models::organization::{
    CreatedOrganization, NewOrganization, Organization, UpdateOrganization,
};
use corral_core::provisioning::CredentialProvisioner;
use corral_core::repository::OrganizationRepository;
use tracing::{info, warn};

use crate::config::RegistryConfig;
use crate::validation::{require, validate_full_name, validate_name};

/// Commits attempted with fresh guids before giving up on a collision.
const MAX_GUID_ATTEMPTS: u32 = 3;

const PRIVATE_KEY_GONE: &str =
    "private_key is issued once at creation and can no longer be updated";

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub full_name: String,
    pub org_type: Option<String>,
}

/// Fields outside of the name that may change on an organization.
#[derive(Debug, Clone, Default)]
pub struct OtherFields {
    pub org_type: Option<String>,
    /// Present when the caller tried to replace the validator key.
    pub private_key: Option<String>,
}

/// A full update request: name, full name and other fields together.
///
/// `name` and `full_name` are optional here so that a missing field can be
/// reported as such rather than as a parse failure.
#[derive(Debug, Clone, Default)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub other: OtherFields,
}

/// Organization registry service.
///
/// Generic over the repository and provisioner so that the registry has no
/// dependency on the database or key-generation crates.
pub struct OrganizationService<R: OrganizationRepository, P: CredentialProvisioner> {
    repo: R,
    provisioner: Arc<P>,
    config: RegistryConfig,
}

impl<R: OrganizationRepository, P: CredentialProvisioner> OrganizationService<R, P> {
    pub fn new(repo: R, provisioner: P, config: RegistryConfig) -> Self {
        Self {
            repo,
            provisioner: Arc::new(provisioner),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn organization_url(&self, name: &str) -> String {
        self.config.organization_url(name)
    }

    /// All live organizations as `name -> canonical URL`.
    pub async fn list(&self) -> CorralResult<BTreeMap<String, String>> {
        let orgs = self.repo.list().await?;
        Ok(orgs
            .into_iter()
            .map(|org| {
                let url = self.organization_url(&org.name);
                (org.name, url)
            })
            .collect())
    }

    pub async fn get(&self, name: &str) -> CorralResult<Organization> {
        self.repo.get_by_name(name).await
    }

    /// Validate, provision credentials and insert a new organization.
    ///
    /// The name check and the insert happen in one storage step: of two
    /// concurrent creates for the same name exactly one succeeds and the
    /// other fails with `AlreadyExists`.
    pub async fn create(&self, input: CreateOrganization) -> CorralResult<CreatedOrganization> {
        validate_name(&input.name)?;
        validate_full_name(&input.full_name)?;

        let provisioner = Arc::clone(&self.provisioner);
        let org_name = input.name.clone();
        let credentials = tokio::task::spawn_blocking(move || provisioner.provision(&org_name))
            .await
            .map_err(|e| CorralError::Internal(format!("provisioning task failed: {e}")))??;

        let mut guid = credentials.guid;
        let mut attempt = 1;
        loop {
            let record = NewOrganization {
                name: input.name.clone(),
                full_name: input.full_name.clone(),
                guid: guid.clone(),
                org_type: input.org_type.clone(),
                validator_client_name: credentials.validator_client_name.clone(),
                validator_public_key: credentials.public_key_pem.clone(),
                validator_key_fingerprint: credentials.public_key_fingerprint.clone(),
            };

            match self.repo.create(record).await {
                Ok(organization) => {
                    info!(
                        organization = %organization.name,
                        guid = %organization.guid,
                        "Organization created"
                    );
                    return Ok(CreatedOrganization {
                        organization,
                        private_key: credentials.private_key,
                    });
                }
                Err(CorralError::IdentifierCollision { id }) if attempt < MAX_GUID_ATTEMPTS => {
                    warn!(guid = %id, attempt, "guid already taken, regenerating");
                    guid = self.provisioner.generate_guid();
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Rename an organization and set its full name in one write.
    ///
    /// Renaming to the current name only updates the full name. Renaming
    /// onto another live organization's name fails with `AlreadyExists`
    /// and leaves the record untouched.
    pub async fn rename(
        &self,
        old_name: &str,
        new_name: &str,
        new_full_name: &str,
    ) -> CorralResult<Organization> {
        self.apply(
            old_name,
            OrganizationChanges {
                name: Some(new_name.to_string()),
                full_name: Some(new_full_name.to_string()),
                other: OtherFields::default(),
            },
        )
        .await
    }

    /// Update fields not covered by rename.
    pub async fn update_other_fields(
        &self,
        name: &str,
        fields: OtherFields,
    ) -> CorralResult<Organization> {
        reject_private_key(&fields)?;

        let update = UpdateOrganization {
            org_type: fields.org_type,
            ..Default::default()
        };
        if update.is_empty() {
            return self.repo.get_by_name(name).await;
        }
        self.repo.update(name, update).await
    }

    /// Apply a complete update: name, full name and other fields.
    ///
    /// An attempt to set `private_key` is rejected with `Gone` before any
    /// other check. Everything else is written in a single storage step.
    pub async fn apply(&self, name: &str, changes: OrganizationChanges) -> CorralResult<Organization> {
        reject_private_key(&changes.other)?;

        let new_name = require(changes.name, "name")?;
        let full_name = require(changes.full_name, "full_name")?;
        validate_name(&new_name)?;
        validate_full_name(&full_name)?;

        let renamed = new_name != name;
        let organization = self
            .repo
            .update(
                name,
                UpdateOrganization {
                    name: renamed.then_some(new_name),
                    full_name: Some(full_name),
                    org_type: changes.other.org_type,
                },
            )
            .await?;

        if renamed {
            info!(from = %name, to = %organization.name, "Organization renamed");
        }
        Ok(organization)
    }

    /// Remove an organization and free its name.
    pub async fn delete(&self, name: &str) -> CorralResult<Organization> {
        let removed = self.repo.delete(name).await?;
        info!(organization = %removed.name, guid = %removed.guid, "Organization deleted");
        Ok(removed)
    }

    /// Storage round trip for health checks.
    pub async fn ping(&self) -> CorralResult<()> {
        self.repo.ping().await
    }
}

fn reject_private_key(fields: &OtherFields) -> CorralResult<()> {
    if fields.private_key.is_some() {
        return Err(CorralError::Gone {
            message: PRIVATE_KEY_GONE.into(),
        });
    }
    Ok(())
}
