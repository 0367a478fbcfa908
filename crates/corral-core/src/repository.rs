//! Repository and collaborator trait definitions.
//!
//! All operations are async. Storage implementations live in `corral-db`;
//! the object enumeration and search index traits describe collaborators
//! owned by the wider platform.

use uuid::Uuid;

use crate::error::CorralResult;
use crate::models::organization::{NewOrganization, Organization, UpdateOrganization};
use crate::models::reindex::{IndexableObject, ObjectType, ReindexJob};

// ---------------------------------------------------------------------------
// Organizations (global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Insert a new organization if no live organization holds its name.
    ///
    /// Uniqueness is enforced by the store in the same step as the insert:
    /// a taken name yields `AlreadyExists`, a taken guid yields
    /// `IdentifierCollision`.
    fn create(
        &self,
        input: NewOrganization,
    ) -> impl Future<Output = CorralResult<Organization>> + Send;

    fn get_by_name(&self, name: &str) -> impl Future<Output = CorralResult<Organization>> + Send;

    /// Apply all changed fields in one write. Renaming onto a name held by
    /// another organization yields `AlreadyExists` and leaves the record
    /// untouched.
    fn update(
        &self,
        name: &str,
        input: UpdateOrganization,
    ) -> impl Future<Output = CorralResult<Organization>> + Send;

    /// Remove an organization, returning the removed record.
    fn delete(&self, name: &str) -> impl Future<Output = CorralResult<Organization>> + Send;

    fn list(&self) -> impl Future<Output = CorralResult<Vec<Organization>>> + Send;

    /// Cheap round trip used by health checks.
    fn ping(&self) -> impl Future<Output = CorralResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Reindexing
// ---------------------------------------------------------------------------

/// Read-only enumeration of an organization's indexable objects.
///
/// Objects belong to the organization's guid, not its name, so a rename
/// keeps the whole object graph attached.
pub trait ObjectSource: Send + Sync {
    fn list_objects(
        &self,
        org_guid: &str,
        object_type: ObjectType,
    ) -> impl Future<Output = CorralResult<Vec<IndexableObject>>> + Send;
}

/// Write side of the search index.
///
/// Entries are keyed by `(org_guid, object_type, id)` and written with
/// overwrite semantics, so resubmitting an object never duplicates it.
pub trait SearchIndex: Send + Sync {
    fn index_put(
        &self,
        org_guid: &str,
        object_type: ObjectType,
        id: &str,
        document: &serde_json::Value,
    ) -> impl Future<Output = CorralResult<()>> + Send;
}

pub trait ReindexJobRepository: Send + Sync {
    /// Insert or overwrite the job record.
    fn save(&self, job: &ReindexJob) -> impl Future<Output = CorralResult<()>> + Send;

    fn get(&self, id: Uuid) -> impl Future<Output = CorralResult<ReindexJob>> + Send;

    /// Jobs for an organization guid, newest first.
    fn list_for_organization(
        &self,
        organization_guid: &str,
    ) -> impl Future<Output = CorralResult<Vec<ReindexJob>>> + Send;
}
