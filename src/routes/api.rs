use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{jargon, recognition};
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // One-shot recognition: pipeline without session merge
        .route("/recognition/process", post(recognition::process_text))
        // Jargon admin: every mutation triggers a dictionary reload
        .route("/jargon", get(jargon::list_jargon).post(jargon::create_jargon))
        .route(
            "/jargon/{id}",
            put(jargon::update_jargon).delete(jargon::delete_jargon),
        )
        .layer(TraceLayer::new_for_http())
}
