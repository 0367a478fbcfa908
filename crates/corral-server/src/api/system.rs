//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::app::AppState;

/// 200 `{"status":"pong"}` when storage answers.
pub(crate) async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.registry.ping().await?;
    Ok(Json(json!({ "status": "pong" })))
}
