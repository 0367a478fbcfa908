//! Operator reindex endpoints.
//!
//! A reindex is started in the background and answered with 202; progress
//! is read back from the persisted job record.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use corral_core::models::reindex::ReindexJob;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::{ApiError, api_not_found};
use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct ReindexStarted {
    pub job_id: Uuid,
    pub uri: String,
}

fn job_uri(state: &AppState, org: &str, job_id: Uuid) -> String {
    format!("{}/_reindex/{job_id}", state.registry.organization_url(org))
}

pub(crate) async fn start_reindex(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.reindexer.spawn(&name).await?;
    let job_id = handle.job_id();
    tracing::info!(organization = %name, %job_id, "reindex requested");

    let body = ReindexStarted {
        job_id,
        uri: job_uri(&state, &name, job_id),
    };
    Ok((StatusCode::ACCEPTED, Json(body)))
}

pub(crate) async fn list_reindex_jobs(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ReindexJob>>, ApiError> {
    Ok(Json(state.reindexer.jobs_for(&name).await?))
}

pub(crate) async fn get_reindex_job(
    State(state): State<AppState>,
    Path((name, job_id)): Path<(String, String)>,
) -> Result<Json<ReindexJob>, ApiError> {
    let not_found = || api_not_found(format!("Reindex job '{job_id}' not found."));

    let id = Uuid::parse_str(&job_id).map_err(|_| not_found())?;
    let org = state.registry.get(&name).await?;
    let job = state.reindexer.job(id).await?;
    if job.organization_guid != org.guid {
        return Err(not_found());
    }
    Ok(Json(job))
}
