//! Read view over the platform's object store.
//!
//! The `org_object` table is written by the services that own nodes,
//! roles, environments, data bags and clients. The reindexer only reads it.
//! Objects are filed under the owning organization's guid.

use corral_core::error::CorralResult;
use corral_core::models::reindex::{IndexableObject, ObjectType};
use corral_core::repository::ObjectSource;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ObjectRow {
    object_id: String,
    body: serde_json::Value,
}

#[derive(Clone)]
pub struct SurrealObjectCatalog<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealObjectCatalog<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Insert or replace one object. Used by the owning services and by
    /// fixtures.
    pub async fn put_object(
        &self,
        org_guid: &str,
        object_type: ObjectType,
        id: &str,
        body: serde_json::Value,
    ) -> CorralResult<()> {
        self.db
            .query(
                "UPSERT type::record('org_object', $key) SET \
                 org_guid = $org_guid, object_type = $object_type, \
                 object_id = $object_id, body = $body",
            )
            .bind(("key", format!("{org_guid}/{object_type}/{id}")))
            .bind(("org_guid", org_guid.to_string()))
            .bind(("object_type", object_type.as_str()))
            .bind(("object_id", id.to_string()))
            .bind(("body", body))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}

impl<C: Connection> ObjectSource for SurrealObjectCatalog<C> {
    async fn list_objects(
        &self,
        org_guid: &str,
        object_type: ObjectType,
    ) -> CorralResult<Vec<IndexableObject>> {
        let mut result = self
            .db
            .query(
                "SELECT object_id, body FROM org_object \
                 WHERE org_guid = $org_guid AND object_type = $object_type \
                 ORDER BY object_id ASC",
            )
            .bind(("org_guid", org_guid.to_string()))
            .bind(("object_type", object_type.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ObjectRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| IndexableObject {
                id: row.object_id,
                body: row.body,
            })
            .collect())
    }
}
