//! Axum WebSocket handler
//!
//! Upgrades the HTTP connection and runs the per-session recognition loop:
//! one inbound text fragment, one merge cycle, one draft reply.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::order::OrderDraft;
use crate::state::AppState;

/// Replies are draft-sized JSON; a modest buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 64;

/// WebSocket recognition handler
pub async fn ws_recognition_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("WebSocket recognition connection upgrade requested");
    ws.on_upgrade(move |socket| handle_recognition_socket(socket, state))
}

/// Manage one WebSocket session: registry lifecycle, inbound loop, reply
/// task. Messages arrive in order off the socket and the registry
/// serializes merges per session, so replies always reflect complete
/// merges in arrival order.
async fn handle_recognition_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let session_id = Uuid::new_v4().to_string();
    info!("WebSocket recognition session established: {}", session_id);

    app_state.sessions.open(&session_id);

    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::channel::<OrderDraft>(CHANNEL_BUFFER_SIZE);

    // Dedicated task for outgoing drafts
    let sender_task = tokio::spawn(async move {
        while let Some(draft) = reply_rx.recv().await {
            match serde_json::to_string(&draft) {
                Ok(json) => {
                    if let Err(e) = sender.send(Message::Text(json.into())).await {
                        error!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize draft: {}", e);
                }
            }
        }
    });

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                debug!("received recognition text: {}", text);
                let draft = app_state.sessions.handle_message(&session_id, &text).await;
                if reply_tx.send(draft).await.is_err() {
                    break;
                }
            }
            Ok(Message::Binary(data)) => {
                debug!("ignoring binary frame: {} bytes", data.len());
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by client: {}", session_id);
                break;
            }
            Err(e) => {
                warn!("WebSocket error on session {}: {}", session_id, e);
                break;
            }
        }
    }

    app_state.sessions.close(&session_id);
    sender_task.abort();
    info!("WebSocket recognition session terminated: {}", session_id);
}
