//! Heartbeat WebSocket used by the browser to detect a live backend.

use crate::state::AppState;
use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(upgrade))
}

#[derive(Debug, Deserialize)]
struct WsEnvelope {
    #[serde(rename = "type")]
    kind: String,
}

async fn upgrade(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_socket)
}

async fn handle_socket(mut socket: WebSocket) {
    let client_id = Uuid::new_v4().to_string();
    info!(client = %client_id, "websocket connected");

    let hello = json!({
        "type": "connected",
        "clientId": client_id,
        "timestamp": Utc::now().to_rfc3339(),
    });
    if socket.send(Message::Text(hello.to_string().into())).await.is_err() {
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                let Some(reply) = reply_to(text.as_str()) else {
                    continue;
                };
                if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(client = %client_id, "websocket disconnected");
}

/// The reply owed to one text frame, if any.
fn reply_to(text: &str) -> Option<Value> {
    let envelope: WsEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => return Some(json!({ "type": "error", "error": format!("invalid message: {err}") })),
    };
    match envelope.kind.as_str() {
        "ping" => Some(json!({ "type": "pong", "timestamp": Utc::now().to_rfc3339() })),
        other => {
            debug!(kind = other, "ignoring websocket message");
            None
        }
    }
}
