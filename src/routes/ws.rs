use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::ws;
use crate::state::AppState;
use std::sync::Arc;

/// Create the WebSocket router
///
/// `/ws/recognition` is intentionally unauthenticated: connections are
/// short-lived per-call intake streams and the service holds no persisted
/// data worth protecting at this layer. Put a reverse proxy in front if a
/// deployment needs access control.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws/recognition", get(ws::ws_recognition_handler))
        .layer(TraceLayer::new_for_http())
}
