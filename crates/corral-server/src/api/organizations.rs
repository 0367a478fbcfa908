//! Organization API handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use corral_core::error::CorralError;
use corral_registry::validation::require;
use corral_registry::{CreateOrganization, OrganizationChanges, OtherFields};
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::payload::{parse_object, string_field};
use crate::app::AppState;

fn required(payload: &Map<String, Value>, key: &'static str) -> Result<String, ApiError> {
    let value = string_field(payload, key)?;
    Ok(require(value, key).map_err(CorralError::from)?)
}

pub(crate) async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

pub(crate) async fn get_organization(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let org = state.registry.get(&name).await?;
    Ok(Json(state.shim.show(&org)))
}

pub(crate) async fn create_organization(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_object(&body)?;
    let input = CreateOrganization {
        name: required(&payload, "name")?,
        full_name: required(&payload, "full_name")?,
        org_type: string_field(&payload, "org_type")?,
    };

    let created = state.registry.create(input).await?;
    let uri = state.registry.organization_url(&created.organization.name);
    let (status, body) = state.shim.created(
        &payload,
        &created.organization,
        uri,
        created.private_key.into_pem(),
    );
    Ok((status, Json(body)))
}

pub(crate) async fn update_organization(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_object(&body)?;

    // A key update is refused before anything else in the body is read.
    let mut changes = OrganizationChanges {
        other: OtherFields {
            private_key: payload.get("private_key").map(Value::to_string),
            org_type: None,
        },
        ..Default::default()
    };
    if changes.other.private_key.is_none() {
        changes.name = string_field(&payload, "name")?;
        changes.full_name = string_field(&payload, "full_name")?;
        changes.other.org_type = string_field(&payload, "org_type")?;
    }

    let org = state.registry.apply(&name, changes).await?;
    let renamed = org.name != name;
    let uri = state.registry.organization_url(&org.name);
    let (status, body) = state.shim.updated(&payload, renamed, uri);
    Ok((status, Json(body)))
}

pub(crate) async fn delete_organization(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.registry.delete(&name).await?;
    let (status, body) = state.shim.deleted(&removed);
    Ok((status, Json(body)))
}
