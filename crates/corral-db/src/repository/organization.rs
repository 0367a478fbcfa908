//! SurrealDB implementation of [`OrganizationRepository`].
//!
//! The `idx_organization_name` UNIQUE index is the only arbiter of name
//! ownership: creates and renames are single statements, so the check and
//! the write happen in the same transaction.

use corral_core::error::CorralResult;
use corral_core::models::organization::{NewOrganization, Organization, UpdateOrganization};
use corral_core::repository::OrganizationRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::retry_conflicts;
use crate::error::DbError;

const ENTITY: &str = "organization";

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    guid: String,
    name: String,
    full_name: String,
    org_type: Option<String>,
    validator_client_name: String,
    validator_public_key: String,
    validator_key_fingerprint: String,
    assigned_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            name: row.name,
            full_name: row.full_name,
            guid: row.guid,
            org_type: row.org_type,
            validator_client_name: row.validator_client_name,
            validator_public_key: row.validator_public_key,
            validator_key_fingerprint: row.validator_key_fingerprint,
            assigned_at: row.assigned_at,
            updated_at: row.updated_at,
        }
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn try_create(&self, input: &NewOrganization) -> Result<Organization, DbError> {
        let result = self
            .db
            .query(
                "CREATE type::record('organization', $guid) SET \
                 guid = $guid, \
                 name = $name, \
                 full_name = $full_name, \
                 org_type = $org_type, \
                 validator_client_name = $validator_client_name, \
                 validator_public_key = $validator_public_key, \
                 validator_key_fingerprint = $validator_key_fingerprint",
            )
            .bind(("guid", input.guid.clone()))
            .bind(("name", input.name.clone()))
            .bind(("full_name", input.full_name.clone()))
            .bind(("org_type", input.org_type.clone()))
            .bind(("validator_client_name", input.validator_client_name.clone()))
            .bind(("validator_public_key", input.validator_public_key.clone()))
            .bind((
                "validator_key_fingerprint",
                input.validator_key_fingerprint.clone(),
            ))
            .await?;

        let mut result = result.check().map_err(|e| {
            DbError::from_statement(e.to_string(), ENTITY, &input.name, &input.guid)
        })?;

        let rows: Vec<OrganizationRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(Organization::from)
            .ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: input.name.clone(),
            })
    }

    async fn try_update(
        &self,
        name: &str,
        input: &UpdateOrganization,
    ) -> Result<Organization, DbError> {
        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $new_name");
        }
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.org_type.is_some() {
            sets.push("org_type = $org_type");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE organization SET {} WHERE name = $name",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("name", name.to_string()));
        if let Some(new_name) = &input.name {
            builder = builder.bind(("new_name", new_name.clone()));
        }
        if let Some(full_name) = &input.full_name {
            builder = builder.bind(("full_name", full_name.clone()));
        }
        if let Some(org_type) = &input.org_type {
            builder = builder.bind(("org_type", org_type.clone()));
        }

        let result = builder.await?;
        let target = input.name.as_deref().unwrap_or(name);
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e.to_string(), ENTITY, target, name))?;

        let rows: Vec<OrganizationRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(Organization::from)
            .ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: name.to_string(),
            })
    }

    async fn try_delete(&self, name: &str) -> Result<Organization, DbError> {
        let result = self
            .db
            .query("DELETE organization WHERE name = $name RETURN BEFORE")
            .bind(("name", name.to_string()))
            .await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(Organization::from)
            .ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: name.to_string(),
            })
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: NewOrganization) -> CorralResult<Organization> {
        Ok(retry_conflicts(|| self.try_create(&input)).await?)
    }

    async fn get_by_name(&self, name: &str) -> CorralResult<Organization> {
        let mut result = self
            .db
            .query("SELECT * FROM organization WHERE name = $name")
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: name.to_string(),
        })?;

        Ok(row.into())
    }

    async fn update(&self, name: &str, input: UpdateOrganization) -> CorralResult<Organization> {
        if input.is_empty() {
            return self.get_by_name(name).await;
        }
        Ok(retry_conflicts(|| self.try_update(name, &input)).await?)
    }

    async fn delete(&self, name: &str) -> CorralResult<Organization> {
        Ok(retry_conflicts(|| self.try_delete(name)).await?)
    }

    async fn list(&self) -> CorralResult<Vec<Organization>> {
        let mut result = self
            .db
            .query("SELECT * FROM organization ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }

    async fn ping(&self) -> CorralResult<()> {
        self.db
            .query("RETURN true")
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }
}
