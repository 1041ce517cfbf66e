use super::{Outcome, Rejection, Room};
use crate::types::*;

/// Relative deviation of `submitted` from `correct`, in percent.
///
/// Always finite: huge deviations saturate at `f64::MAX`. A correct value
/// of zero yields 0 for an exact hit and `f64::MAX` otherwise.
pub fn error_percent(submitted: f64, correct: f64) -> f64 {
    let diff = (submitted - correct).abs();
    if correct == 0.0 {
        return if diff == 0.0 { 0.0 } else { f64::MAX };
    }
    (diff * 100.0 / correct.abs()).min(f64::MAX)
}

impl Room {
    /// Score the designated answerer's estimate and show the result
    pub fn submit_answer(&mut self, connection: &str, answer: &Answer) -> Outcome {
        self.require_phase(&[Phase::Playing])?;
        let sender = self
            .participant(connection)
            .ok_or(Rejection::UnknownConnection)?;
        if self.answerer.as_deref() != Some(sender.uid.as_str()) {
            return Err(Rejection::NotAnswerer);
        }
        let submitted = answer.value().ok_or(Rejection::MalformedAnswer)?;
        let correct = match &self.current_question {
            Some(question) => question.answer,
            None => return Err(Rejection::WrongPhase { actual: self.phase }),
        };

        let error = error_percent(submitted, correct);
        self.add_log(
            format!(
                "Answer: {} (correct: {}) - error: {:.1}%",
                submitted, correct, error
            ),
            LogKind::Result,
        );

        let winner = if error >= self.settings.error_threshold {
            if let Some(traitor) = self.traitor.clone() {
                if let Some(participant) = self.participant_by_uid_mut(&traitor) {
                    participant.score += ROUND_POINTS;
                }
            }
            Winner::Traitor
        } else {
            for participant in self.participants.values_mut() {
                if participant.role == Role::Citizen {
                    participant.score += ROUND_POINTS;
                }
            }
            Winner::Citizens
        };

        tracing::info!(
            "Turn {}: answered {} vs {} ({:.1}% off), {} win",
            self.current_turn,
            submitted,
            correct,
            error,
            winner.label()
        );
        self.last_result = Some(RoundResult {
            answer: submitted,
            correct,
            error,
            winner,
            winner_label: winner.label().to_string(),
        });
        self.phase = Phase::AnswerResult;
        Ok(())
    }
}
