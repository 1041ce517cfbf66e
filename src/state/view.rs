//! Client-safe projection of the room.
//!
//! This is the only shape of the state that ever leaves the server.

use super::Room;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Public fields of one participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantView {
    pub name: String,
    pub uid: Uid,
    pub ready: bool,
    pub score: i64,
    pub connected: bool,
    pub round_ready: bool,
    pub reset_ready: bool,
    pub role: VisibleRole,
}

/// The question on screen. The answer stays hidden until it has been given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionView {
    pub prompt: String,
    pub answer: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub phase: Phase,
    pub settings: GameSettings,
    pub current_turn: u32,
    pub question_count: usize,
    pub logs: Vec<LogEntry>,
    /// Keyed by connection id
    pub players: BTreeMap<ConnectionId, ParticipantView>,
    pub question: Option<QuestionView>,
    pub answerer_sid: Option<ConnectionId>,
    pub answerer_uid: Option<Uid>,
    pub last_result: Option<RoundResult>,
    pub votes_cast: usize,
    /// Only filled in once the game is over
    pub traitor_sid: Option<ConnectionId>,
    pub traitor_uid: Option<Uid>,
}

impl Room {
    /// Build the snapshot broadcast to every client
    pub fn view(&self) -> RoomView {
        let revealed = self.phase == Phase::Final;

        let players = self
            .participants
            .iter()
            .map(|(connection, p)| {
                let role = if revealed {
                    VisibleRole::from(p.role)
                } else {
                    VisibleRole::Hidden
                };
                (
                    connection.clone(),
                    ParticipantView {
                        name: p.name.clone(),
                        uid: p.uid.clone(),
                        ready: p.ready,
                        score: p.score,
                        connected: p.connected,
                        round_ready: p.round_ready,
                        reset_ready: p.reset_ready,
                        role,
                    },
                )
            })
            .collect();

        let question = match self.phase {
            Phase::Playing | Phase::AnswerResult => {
                self.current_question.as_ref().map(|q| QuestionView {
                    prompt: q.prompt.clone(),
                    answer: (self.phase == Phase::AnswerResult).then_some(q.answer),
                })
            }
            _ => None,
        };

        let connection_of = |uid: &Uid| self.connection_by_uid.get(uid).cloned();
        let traitor_uid = self.traitor.clone().filter(|_| revealed);

        RoomView {
            phase: self.phase,
            settings: self.settings,
            current_turn: self.current_turn,
            question_count: self.questions.len(),
            logs: self.log.clone(),
            players,
            question,
            answerer_sid: self.answerer.as_ref().and_then(connection_of),
            answerer_uid: self.answerer.clone(),
            last_result: self.last_result.clone(),
            votes_cast: self.votes.len(),
            traitor_sid: traitor_uid.as_ref().and_then(connection_of),
            traitor_uid,
        }
    }
}
