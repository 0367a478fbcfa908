//! SurrealDB-backed search index writer.
//!
//! Documents are stored under a record id derived from
//! `(org_guid, object_type, object_id)`, so a put is always an overwrite
//! and a renamed organization keeps its documents.

use corral_core::error::{CorralError, CorralResult};
use corral_core::models::reindex::ObjectType;
use corral_core::repository::SearchIndex;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    document: serde_json::Value,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn document_key(org_guid: &str, object_type: ObjectType, id: &str) -> String {
    format!("{org_guid}/{object_type}/{id}")
}

fn unavailable(err: impl ToString) -> CorralError {
    CorralError::IndexBackendUnavailable(err.to_string())
}

#[derive(Clone)]
pub struct SurrealSearchIndex<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSearchIndex<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Fetch the indexed document for one object, if any.
    pub async fn get_document(
        &self,
        org_guid: &str,
        object_type: ObjectType,
        id: &str,
    ) -> CorralResult<Option<serde_json::Value>> {
        let mut result = self
            .db
            .query("SELECT document FROM type::record('search_document', $key)")
            .bind(("key", document_key(org_guid, object_type, id)))
            .await
            .map_err(unavailable)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(unavailable)?;
        Ok(rows.into_iter().next().map(|row| row.document))
    }

    /// Number of documents indexed for an organization guid.
    pub async fn count_for_organization(&self, org_guid: &str) -> CorralResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM search_document \
                 WHERE org_guid = $org_guid GROUP ALL",
            )
            .bind(("org_guid", org_guid.to_string()))
            .await
            .map_err(unavailable)?;

        let rows: Vec<CountRow> = result.take(0).map_err(unavailable)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> SearchIndex for SurrealSearchIndex<C> {
    async fn index_put(
        &self,
        org_guid: &str,
        object_type: ObjectType,
        id: &str,
        document: &serde_json::Value,
    ) -> CorralResult<()> {
        self.db
            .query(
                "UPSERT type::record('search_document', $key) SET \
                 org_guid = $org_guid, \
                 object_type = $object_type, \
                 object_id = $object_id, \
                 document = $document, \
                 indexed_at = time::now()",
            )
            .bind(("key", document_key(org_guid, object_type, id)))
            .bind(("org_guid", org_guid.to_string()))
            .bind(("object_type", object_type.as_str()))
            .bind(("object_id", id.to_string()))
            .bind(("document", document.clone()))
            .await
            .map_err(unavailable)?
            .check()
            .map_err(unavailable)?;

        Ok(())
    }
}
