//! One-shot recognition endpoint.
//!
//! Runs the full pipeline (normalize, cache, extract, enrich) on a raw
//! text body without touching any session draft. The pipeline itself
//! degrades internal failures to an empty fragment, so a non-200 here
//! means something genuinely unexpected.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub async fn process_text(
    State(state): State<Arc<AppState>>,
    body: String,
) -> AppResult<Json<serde_json::Value>> {
    info!("one-shot recognition request: {} bytes", body.len());
    let fragment = state.pipeline.process(&body).await;
    let payload = serde_json::to_value(&fragment)
        .map_err(|e| AppError::InternalServerError(format!("fragment serialization: {e}")))?;
    Ok(Json(payload))
}
