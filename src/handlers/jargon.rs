//! Jargon admin endpoints.
//!
//! Thin CRUD over the in-memory jargon store. Every mutation publishes a
//! `JargonEvent`, which the reload task turns into a wholesale dictionary
//! refresh; the mutation response does not wait for the reload.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::jargon::JargonEntry;
use crate::errors::{AppError, AppResult};
use crate::state::{AppState, JargonEvent};

#[derive(Debug, Deserialize)]
pub struct JargonPayload {
    pub slang_term: String,
    pub canonical_term: String,
}

pub async fn list_jargon(State(state): State<Arc<AppState>>) -> Json<Vec<JargonEntry>> {
    Json(state.jargon_store.list())
}

pub async fn create_jargon(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JargonPayload>,
) -> AppResult<Json<JargonEntry>> {
    if payload.slang_term.is_empty() {
        return Err(AppError::BadRequest("slang_term must not be empty".to_string()));
    }
    let entry = state
        .jargon_store
        .create(payload.slang_term, payload.canonical_term);
    state.notify_jargon_changed(JargonEvent::Created(entry.id));
    Ok(Json(entry))
}

pub async fn update_jargon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<JargonPayload>,
) -> AppResult<Json<JargonEntry>> {
    if payload.slang_term.is_empty() {
        return Err(AppError::BadRequest("slang_term must not be empty".to_string()));
    }
    let entry = state
        .jargon_store
        .update(id, payload.slang_term, payload.canonical_term)
        .ok_or_else(|| AppError::NotFound(format!("jargon entry {id}")))?;
    state.notify_jargon_changed(JargonEvent::Updated(id));
    Ok(Json(entry))
}

pub async fn delete_jargon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    if !state.jargon_store.delete(id) {
        return Err(AppError::NotFound(format!("jargon entry {id}")));
    }
    state.notify_jargon_changed(JargonEvent::Deleted(id));
    Ok(())
}
