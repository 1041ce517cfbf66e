use super::{Outcome, Rejection, Room, MIN_PLAYERS};
use crate::types::*;

impl Room {
    /// Register a new player or move an existing uid onto a new connection.
    ///
    /// On reconnect the stored record wins: name, score, role and flags are
    /// kept and `name` is ignored.
    pub fn join(&mut self, connection: &str, uid: &str, name: &str) -> Outcome {
        if uid.trim().is_empty() {
            return Err(Rejection::MissingUid);
        }
        if let Some(existing) = self.participants.get(connection) {
            if existing.uid != uid {
                return Err(Rejection::ConnectionTaken);
            }
        }

        if let Some(old_connection) = self.connection_by_uid.get(uid).cloned() {
            if let Some(mut participant) = self.participants.remove(&old_connection) {
                participant.connected = true;
                tracing::info!(
                    "{} reconnected ({} -> {})",
                    participant.name,
                    old_connection,
                    connection
                );
                self.participants.insert(connection.to_string(), participant);
                self.connection_by_uid
                    .insert(uid.to_string(), connection.to_string());

                // A cast vote follows its voter to the new connection
                if let Some(target) = self.votes.remove(&old_connection) {
                    self.votes.insert(connection.to_string(), target);
                }
                return Ok(());
            }
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::MissingName);
        }

        self.participants.insert(
            connection.to_string(),
            Participant::new(uid.to_string(), name.to_string()),
        );
        self.connection_by_uid
            .insert(uid.to_string(), connection.to_string());
        self.add_log(format!("{} joined the room.", name), LogKind::System);
        tracing::info!("{} joined as {} on {}", name, uid, connection);
        Ok(())
    }

    /// Mark a connection as gone. The record stays so the uid can come back.
    pub fn disconnect(&mut self, connection: &str) -> Outcome {
        let participant = self.participant_mut(connection)?;
        participant.connected = false;
        tracing::info!("{} disconnected", participant.name);
        Ok(())
    }

    /// Flip the ready flag in the lobby; starts the game once everyone is ready.
    ///
    /// Unlike the acknowledgement checks, this counts disconnected players
    /// too: a registered player who dropped out blocks the start.
    pub fn toggle_ready(&mut self, connection: &str) -> Outcome {
        self.require_phase(&[Phase::Lobby])?;
        let participant = self.participant_mut(connection)?;
        participant.ready = !participant.ready;
        tracing::debug!("{} ready: {}", participant.name, participant.ready);

        if self.participants.len() >= MIN_PLAYERS && self.participants.values().all(|p| p.ready) {
            self.start_game();
        }
        Ok(())
    }

    pub fn chat(&mut self, connection: &str, message: &str) -> Outcome {
        let message = message.trim();
        if message.is_empty() {
            return Err(Rejection::EmptyMessage);
        }
        let name = self
            .participant(connection)
            .ok_or(Rejection::UnknownConnection)?
            .name
            .clone();
        self.add_log(format!("{}: {}", name, message), LogKind::Chat);
        Ok(())
    }
}
