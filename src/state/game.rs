use super::{Outcome, Rejection, Room};
use crate::types::*;

impl Room {
    /// Replace the room's settings. Lobby only.
    pub fn update_settings(&mut self, connection: &str, settings: GameSettings) -> Outcome {
        self.require_phase(&[Phase::Lobby])?;
        if self.participant(connection).is_none() {
            return Err(Rejection::UnknownConnection);
        }
        self.settings = settings;
        self.add_log("Game settings were changed.", LogKind::System);
        tracing::info!("Settings updated: {:?}", settings);
        Ok(())
    }

    /// Lobby -> Playing: assign roles, draw questions, start turn 1
    pub(super) fn start_game(&mut self) {
        self.phase = Phase::Playing;
        self.current_turn = 1;
        self.log.clear();
        self.last_result = None;
        self.votes.clear();
        self.add_log("=== Game start ===", LogKind::System);

        let traitor_index = self.picker.pick(self.participants.len());
        for (i, participant) in self.participants.values_mut().enumerate() {
            participant.role = if i == traitor_index {
                Role::Traitor
            } else {
                Role::Citizen
            };
            participant.score = 0;
        }
        self.traitor = self
            .participants
            .values()
            .find(|p| p.role == Role::Traitor)
            .map(|p| p.uid.clone());

        let amount = (self.settings.total_turns as usize).min(self.catalog.len());
        let picked = self.picker.sample(self.catalog.len(), amount);
        self.questions = picked
            .into_iter()
            .map(|i| self.catalog.questions()[i].clone())
            .collect();

        tracing::info!(
            "Game started with {} players and {} questions",
            self.participants.len(),
            self.questions.len()
        );
        self.advance_turn();
    }

    /// Load the current turn, or open the vote once the questions run out
    fn advance_turn(&mut self) {
        if self.current_turn as usize > self.questions.len() {
            self.phase = Phase::Voting;
            self.votes.clear();
            self.add_log(
                "All turns are over! Time to vote for the traitor.",
                LogKind::Important,
            );
            tracing::info!("Voting opened");
            return;
        }

        self.phase = Phase::Playing;
        self.current_question = self
            .questions
            .get(self.current_turn as usize - 1)
            .cloned();

        // Anyone registered can be called on, connected or not
        if self.participants.is_empty() {
            self.answerer = None;
            return;
        }
        let index = self.picker.pick(self.participants.len());
        let Some(chosen) = self.participants.values().nth(index) else {
            return;
        };
        let (uid, name) = (chosen.uid.clone(), chosen.name.clone());
        self.answerer = Some(uid);
        self.add_log(
            format!("Turn {}: {} is answering.", self.current_turn, name),
            LogKind::Info,
        );
        tracing::info!("Turn {} answerer: {}", self.current_turn, name);
    }

    /// Set this player's "next" flag; advance once every connected player has.
    ///
    /// Only players currently connected are waited on.
    pub fn acknowledge_advance(&mut self, connection: &str) -> Outcome {
        self.require_phase(&[Phase::AnswerResult, Phase::Final])?;
        self.participant_mut(connection)?.round_ready = true;

        if self.all_connected(|p| p.round_ready) {
            for participant in self.participants.values_mut() {
                participant.round_ready = false;
            }
            if self.phase == Phase::AnswerResult {
                self.current_turn += 1;
                self.advance_turn();
            }
        }
        Ok(())
    }

    /// Set this player's reset flag; rebuild the room once every connected
    /// player has. Accepted in any phase.
    pub fn acknowledge_reset(&mut self, connection: &str) -> Outcome {
        self.participant_mut(connection)?.reset_ready = true;
        if self.all_connected(|p| p.reset_ready) {
            self.reset();
        }
        Ok(())
    }

    /// Back to a fresh lobby. Connected players are re-admitted with a clean
    /// slate; disconnected ones are dropped for good.
    fn reset(&mut self) {
        let previous = std::mem::take(&mut self.participants);
        self.connection_by_uid.clear();

        self.settings = self.default_settings;
        self.phase = Phase::Lobby;
        self.current_turn = 0;
        self.questions.clear();
        self.current_question = None;
        self.answerer = None;
        self.traitor = None;
        self.votes.clear();
        self.last_result = None;
        self.log.clear();

        for (connection, participant) in previous {
            if !participant.connected {
                tracing::info!("Dropping {} from the roster", participant.name);
                continue;
            }
            self.connection_by_uid
                .insert(participant.uid.clone(), connection.clone());
            self.participants.insert(
                connection,
                Participant::new(participant.uid, participant.name),
            );
        }

        self.add_log("The game has been reset.", LogKind::System);
        tracing::info!("Room reset with {} players", self.participants.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{room_with_three, started_room};
    use std::collections::HashSet;

    /// Submit an exact answer for the current turn from whoever is answering
    fn answer_exactly(room: &mut Room) {
        let uid = room.answerer().unwrap().clone();
        let connection = room.participant_by_uid(&uid).unwrap().0.clone();
        let correct = room.current_question().unwrap().answer;
        room.submit_answer(&connection, &Answer::Number(correct))
            .unwrap();
    }

    fn acknowledge_all(room: &mut Room, connections: &[&str]) {
        for connection in connections {
            room.acknowledge_advance(connection).unwrap();
        }
    }

    #[test]
    fn test_update_settings_in_lobby() {
        let mut room = room_with_three([]);
        let settings = GameSettings::new(2, 25.0, 1.5).unwrap();
        room.update_settings("c1", settings).unwrap();
        assert_eq!(*room.settings(), settings);
        assert_eq!(room.log().last().unwrap().kind, LogKind::System);
    }

    #[test]
    fn test_update_settings_rejected_outside_lobby() {
        let mut room = started_room([]);
        let settings = GameSettings::new(2, 25.0, 1.5).unwrap();
        assert!(matches!(
            room.update_settings("c1", settings),
            Err(Rejection::WrongPhase { .. })
        ));
        assert_eq!(*room.settings(), GameSettings::default());
    }

    #[test]
    fn test_update_settings_requires_known_sender() {
        let mut room = room_with_three([]);
        assert_eq!(
            room.update_settings("stranger", GameSettings::default()),
            Err(Rejection::UnknownConnection)
        );
    }

    #[test]
    fn test_start_assigns_exactly_one_traitor() {
        for traitor_index in 0..3 {
            let room = started_room([traitor_index]);
            let traitors: Vec<_> = room
                .participants()
                .values()
                .filter(|p| p.role == Role::Traitor)
                .collect();
            assert_eq!(traitors.len(), 1);
            assert_eq!(room.traitor(), Some(&traitors[0].uid));
            let citizens = room
                .participants()
                .values()
                .filter(|p| p.role == Role::Citizen)
                .count();
            assert_eq!(citizens, 2);
        }
    }

    #[test]
    fn test_start_with_random_picker_many_times() {
        use crate::catalog::Catalog;
        use crate::rng::RandomPicker;

        for seed in 0..25 {
            let mut room = Room::new(
                Catalog::builtin(),
                GameSettings::new(4, 10.0, 2.0).unwrap(),
                Box::new(RandomPicker::seeded(seed)),
            );
            for i in 0..5 {
                room.join(&format!("c{}", i), &format!("u{}", i), &format!("p{}", i))
                    .unwrap();
            }
            for i in 0..5 {
                room.toggle_ready(&format!("c{}", i)).unwrap();
            }

            let traitors = room
                .participants()
                .values()
                .filter(|p| p.role == Role::Traitor)
                .count();
            assert_eq!(traitors, 1);
            assert_eq!(room.questions().len(), 4);
            let prompts: HashSet<_> = room.questions().iter().map(|q| &q.prompt).collect();
            assert_eq!(prompts.len(), 4, "questions must not repeat");
        }
    }

    #[test]
    fn test_question_count_is_capped_by_catalog() {
        let mut room = room_with_three([]);
        room.update_settings("c1", GameSettings::new(10, 10.0, 2.0).unwrap())
            .unwrap();
        for connection in ["c1", "c2", "c3"] {
            room.toggle_ready(connection).unwrap();
        }
        // The test catalog has four questions
        assert_eq!(room.questions().len(), 4);
    }

    #[test]
    fn test_start_resets_scores_and_log() {
        let mut room = room_with_three([]);
        room.chat("c1", "hello").unwrap();
        for connection in ["c1", "c2", "c3"] {
            room.toggle_ready(connection).unwrap();
        }
        assert!(room.participants().values().all(|p| p.score == 0));
        assert_eq!(room.log()[0].msg, "=== Game start ===");
        assert!(!room.log().iter().any(|entry| entry.kind == LogKind::Chat));
    }

    #[test]
    fn test_answerer_is_chosen_by_picker() {
        // traitor c1, answerer index 2 -> c3
        let room = started_room([0, 2]);
        assert_eq!(room.answerer().map(String::as_str), Some("u3"));
        assert_eq!(room.current_question().unwrap().prompt, "Q1");
        assert!(room.log().last().unwrap().msg.contains("carol"));
    }

    #[test]
    fn test_answerer_can_be_disconnected_player() {
        // traitor c1, turn 1 answerer c2, turn 2 answerer c3
        let mut room = started_room([0, 1, 2]);
        room.submit_answer("c2", &Answer::Number(100.0)).unwrap();
        room.disconnect("c3").unwrap();
        acknowledge_all(&mut room, &["c1", "c2"]);

        assert_eq!(room.current_turn(), 2);
        assert_eq!(room.answerer().map(String::as_str), Some("u3"));
        assert!(!room.participant("c3").unwrap().connected);
    }

    #[test]
    fn test_advance_waits_for_every_connected_player() {
        let mut room = started_room([0, 1]);
        answer_exactly(&mut room);
        assert_eq!(room.phase(), Phase::AnswerResult);

        room.acknowledge_advance("c1").unwrap();
        room.acknowledge_advance("c2").unwrap();
        assert_eq!(room.phase(), Phase::AnswerResult);
        assert!(room.participant("c1").unwrap().round_ready);

        room.acknowledge_advance("c3").unwrap();
        assert_eq!(room.phase(), Phase::Playing);
        assert_eq!(room.current_turn(), 2);
        assert_eq!(room.current_question().unwrap().prompt, "Q2");
        assert!(room.participants().values().all(|p| !p.round_ready));
    }

    #[test]
    fn test_advance_ignores_disconnected_players() {
        let mut room = started_room([0, 1]);
        answer_exactly(&mut room);
        room.disconnect("c3").unwrap();

        room.acknowledge_advance("c1").unwrap();
        room.acknowledge_advance("c2").unwrap();
        assert_eq!(room.phase(), Phase::Playing);
        assert_eq!(room.current_turn(), 2);
    }

    #[test]
    fn test_advance_rejected_while_playing() {
        let mut room = started_room([]);
        assert_eq!(
            room.acknowledge_advance("c1"),
            Err(Rejection::WrongPhase {
                actual: Phase::Playing
            })
        );
        assert!(!room.participant("c1").unwrap().round_ready);
    }

    #[test]
    fn test_final_turn_opens_voting() {
        let mut room = started_room([0]);
        let all = ["c1", "c2", "c3"];
        for turn in 1..=3 {
            assert_eq!(room.current_turn(), turn);
            answer_exactly(&mut room);
            acknowledge_all(&mut room, &all);
        }
        assert_eq!(room.phase(), Phase::Voting);
        assert!(room.votes().is_empty());
        assert_eq!(room.log().last().unwrap().kind, LogKind::Important);
    }

    #[test]
    fn test_reset_waits_for_all_connected_and_keeps_connected_players() {
        let mut room = started_room([0, 1]);
        answer_exactly(&mut room);
        room.disconnect("c3").unwrap();

        room.acknowledge_reset("c1").unwrap();
        assert_eq!(room.phase(), Phase::AnswerResult);
        assert!(room.participant("c1").unwrap().reset_ready);

        room.acknowledge_reset("c2").unwrap();
        assert_eq!(room.phase(), Phase::Lobby);
        assert_eq!(room.participants().len(), 2);
        assert!(room.participant("c3").is_none());
        assert!(room.participant_by_uid("u3").is_none());

        for participant in room.participants().values() {
            assert_eq!(participant.score, 0);
            assert_eq!(participant.role, Role::Citizen);
            assert!(!participant.ready);
            assert!(!participant.reset_ready);
            assert!(participant.connected);
        }
        assert_eq!(room.participant("c1").unwrap().name, "alice");
        assert!(room.traitor().is_none());
        assert!(room.last_result().is_none());
        assert_eq!(room.current_turn(), 0);
        assert_eq!(room.log().len(), 1);
    }

    #[test]
    fn test_reset_restores_default_settings() {
        let mut room = room_with_three([]);
        room.update_settings("c1", GameSettings::new(7, 5.0, 4.0).unwrap())
            .unwrap();
        for connection in ["c1", "c2", "c3"] {
            room.acknowledge_reset(connection).unwrap();
        }
        assert_eq!(*room.settings(), GameSettings::default());
    }

    #[test]
    fn test_reset_requires_known_sender() {
        let mut room = room_with_three([]);
        assert_eq!(
            room.acknowledge_reset("ghost"),
            Err(Rejection::UnknownConnection)
        );
    }
}
