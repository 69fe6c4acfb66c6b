use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

/// Realtime notifications pushed to the owning user's sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    LevelUp {
        user_id: Uuid,
        level: i32,
        title: String,
        total_points: i64,
    },
    BadgeUnlocked {
        user_id: Uuid,
        badge_id: String,
        badge_name: Option<String>,
    },
    ChallengeCompleted {
        user_id: Uuid,
        challenge_id: String,
    },
}

impl ProgressEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            ProgressEvent::LevelUp { user_id, .. }
            | ProgressEvent::BadgeUnlocked { user_id, .. }
            | ProgressEvent::ChallengeCompleted { user_id, .. } => *user_id,
        }
    }
}

/// Fire-and-forget: no subscribers is not an error.
pub fn publish(state: &AppState, event: &ProgressEvent) {
    match serde_json::to_string(event) {
        Ok(msg) => {
            let _ = state.ws_tx.send(msg);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to encode progress event"),
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: Uuid,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.user_id))
}

/// Whether a broadcast message belongs to `user_id`.
fn is_for_user(msg: &str, user_id: Uuid) -> bool {
    serde_json::from_str::<ProgressEvent>(msg)
        .map(|event| event.user_id() == user_id)
        .unwrap_or(false)
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(user_id = %user_id, "WebSocket connection established");

    let mut rx = state.ws_tx.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if !is_for_user(&msg, user_id) {
                        continue;
                    }
                    if sender.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %user_id, skipped, "WebSocket subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!(user_id = %user_id, message = %text, "WebSocket message received");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(user_id = %user_id, "WebSocket connection closed");
}
