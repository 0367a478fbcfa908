//! SurrealDB implementation of [`ReindexJobRepository`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use corral_core::error::CorralResult;
use corral_core::models::reindex::{JobStatus, ObjectType, ReindexJob, TypeProgress};
use corral_core::repository::ReindexJobRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ReindexJobRow {
    organization_guid: String,
    organization_name: String,
    status: String,
    per_type_progress: serde_json::Value,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ReindexJobRowWithId {
    record_id: String,
    organization_guid: String,
    organization_name: String,
    status: String,
    per_type_progress: serde_json::Value,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ReindexJobRow {
    fn into_job(self, id: Uuid) -> Result<ReindexJob, DbError> {
        let status = self.status.parse::<JobStatus>().map_err(DbError::Decode)?;
        let per_type_progress: BTreeMap<ObjectType, TypeProgress> =
            serde_json::from_value(self.per_type_progress)
                .map_err(|e| DbError::Decode(format!("per_type_progress: {e}")))?;
        Ok(ReindexJob {
            id,
            organization_guid: self.organization_guid,
            organization_name: self.organization_name,
            status,
            per_type_progress,
            started_at: self.started_at,
            finished_at: self.finished_at,
        })
    }
}

impl ReindexJobRowWithId {
    fn try_into_job(self) -> Result<ReindexJob, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        ReindexJobRow {
            organization_guid: self.organization_guid,
            organization_name: self.organization_name,
            status: self.status,
            per_type_progress: self.per_type_progress,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
        .into_job(id)
    }
}

/// SurrealDB implementation of the reindex job repository.
#[derive(Clone)]
pub struct SurrealReindexJobRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReindexJobRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReindexJobRepository for SurrealReindexJobRepository<C> {
    async fn save(&self, job: &ReindexJob) -> CorralResult<()> {
        let progress = serde_json::to_value(&job.per_type_progress)
            .map_err(|e| DbError::Decode(format!("per_type_progress: {e}")))?;

        self.db
            .query(
                "UPSERT type::record('reindex_job', $id) SET \
                 organization_guid = $organization_guid, \
                 organization_name = $organization_name, \
                 status = $status, \
                 per_type_progress = $per_type_progress, \
                 started_at = $started_at, \
                 finished_at = $finished_at",
            )
            .bind(("id", job.id.to_string()))
            .bind(("organization_guid", job.organization_guid.clone()))
            .bind(("organization_name", job.organization_name.clone()))
            .bind(("status", job.status.as_str()))
            .bind(("per_type_progress", progress))
            .bind(("started_at", job.started_at))
            .bind(("finished_at", job.finished_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> CorralResult<ReindexJob> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('reindex_job', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReindexJobRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reindex_job".into(),
            id: id_str,
        })?;

        Ok(row.into_job(id)?)
    }

    async fn list_for_organization(&self, organization_guid: &str) -> CorralResult<Vec<ReindexJob>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM reindex_job \
                 WHERE organization_guid = $organization_guid \
                 ORDER BY started_at DESC",
            )
            .bind(("organization_guid", organization_guid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReindexJobRowWithId> = result.take(0).map_err(DbError::from)?;
        let jobs = rows
            .into_iter()
            .map(|row| row.try_into_job())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(jobs)
    }
}
