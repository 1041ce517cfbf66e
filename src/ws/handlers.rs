//! WebSocket message dispatch
//!
//! Every event runs against the room under one lock. Accepted events
//! broadcast a fresh snapshot; rejected ones are logged and dropped.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, Outcome, Rejection};
use crate::types::{ConnectionId, GameSettings};
use std::sync::Arc;

/// Trim and cap a display name, falling back to a generated one
fn normalize_name(name: Option<&str>, max_chars: usize) -> String {
    let trimmed: String = name
        .unwrap_or_default()
        .trim()
        .chars()
        .take(max_chars)
        .collect();
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    petname::petname(2, " ").unwrap_or_else(|| "Anonymous".to_string())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Handle client messages and return an optional reply for this socket only
pub async fn handle_message(
    msg: ClientMessage,
    connection: &ConnectionId,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let mut room = state.room.lock().await;
    let mut reply = None;

    let outcome: Outcome = match msg {
        ClientMessage::Join { name, uid } => {
            let name = normalize_name(name.as_deref(), state.limits.max_name_chars);
            let result = room.join(connection, &uid, &name);
            if result.is_ok() {
                reply = Some(ServerMessage::YourInfo {
                    sid: connection.clone(),
                    uid,
                });
            }
            result
        }

        ClientMessage::UpdateSettings {
            turns,
            threshold,
            multiplier,
        } => GameSettings::new(turns, threshold, multiplier)
            .map_err(Rejection::from)
            .and_then(|settings| room.update_settings(connection, settings)),

        ClientMessage::ToggleReady => room.toggle_ready(connection),

        ClientMessage::SubmitAnswer { answer } => room.submit_answer(connection, &answer),

        ClientMessage::AdvanceAcknowledge => room.acknowledge_advance(connection),

        ClientMessage::Vote { target_uid } => room.cast_vote(connection, &target_uid),

        ClientMessage::ResetAcknowledge => room.acknowledge_reset(connection),

        ClientMessage::Chat { msg } => {
            let msg = truncate_chars(msg.trim(), state.limits.max_chat_chars);
            room.chat(connection, &msg)
        }
    };

    match outcome {
        Ok(()) => state.broadcast_view(&room),
        Err(rejection) => {
            tracing::debug!("Ignored event from {}: {}", connection, rejection);
        }
    }
    reply
}

/// Mark the socket's participant as disconnected, if it ever joined
pub async fn handle_disconnect(connection: &ConnectionId, state: &Arc<AppState>) {
    let mut room = state.room.lock().await;
    match room.disconnect(connection) {
        Ok(()) => state.broadcast_view(&room),
        Err(_) => tracing::debug!("Socket {} closed without joining", connection),
    }
}
