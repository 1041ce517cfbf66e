use super::{Outcome, Rejection, Room};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Every uid tied for the most accusations
pub fn leading_suspects(votes: &BTreeMap<ConnectionId, Uid>) -> BTreeSet<Uid> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for target in votes.values() {
        *counts.entry(target.as_str()).or_insert(0) += 1;
    }

    let max = counts.values().copied().max().unwrap_or(0);
    counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(uid, _)| uid.to_string())
        .collect()
}

impl Room {
    /// Accuse a player. Tabulates as soon as every connected player has voted.
    pub fn cast_vote(&mut self, connection: &str, target_uid: &str) -> Outcome {
        self.require_phase(&[Phase::Voting])?;
        let voter = self
            .participant(connection)
            .ok_or(Rejection::UnknownConnection)?;
        if voter.uid == target_uid {
            return Err(Rejection::SelfVote);
        }
        if !self.connection_by_uid.contains_key(target_uid) {
            return Err(Rejection::UnknownTarget(target_uid.to_string()));
        }
        tracing::info!("{} voted for {}", voter.name, target_uid);

        self.votes
            .insert(connection.to_string(), target_uid.to_string());
        if self.votes.len() >= self.connected_count() {
            self.tabulate();
        }
        Ok(())
    }

    /// Resolve the vote: a caught traitor drops to zero, an escaped one
    /// has their score multiplied.
    fn tabulate(&mut self) {
        let suspects = leading_suspects(&self.votes);
        let caught = self
            .traitor
            .as_ref()
            .is_some_and(|traitor| suspects.contains(traitor));
        let multiplier = self.settings.traitor_multiplier;

        if let Some(traitor) = self.traitor.clone() {
            if let Some(participant) = self.participant_by_uid_mut(&traitor) {
                participant.score = if caught {
                    0
                } else {
                    (participant.score as f64 * multiplier).round() as i64
                };
            }
        }

        let message = if caught {
            "The traitor has been exposed! The citizens win!".to_string()
        } else {
            format!(
                "The traitor got away! Their points are multiplied by {}!",
                multiplier
            )
        };
        tracing::info!(
            "Vote tabulated: suspects {:?}, traitor caught: {}",
            suspects,
            caught
        );
        self.add_log(message, LogKind::Important);
        self.phase = Phase::Final;
    }
}
