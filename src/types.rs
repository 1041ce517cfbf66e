use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type Uid = String;

/// Points awarded to the winning side of a round
pub const ROUND_POINTS: i64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    Playing,
    AnswerResult,
    Voting,
    Final,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen,
    Traitor,
}

/// Role as shown to clients: hidden until the game is over
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibleRole {
    Hidden,
    Citizen,
    Traitor,
}

impl From<Role> for VisibleRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Citizen => VisibleRole::Citizen,
            Role::Traitor => VisibleRole::Traitor,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("turn count must be at least 1")]
    NoTurns,

    #[error("error threshold must be a finite, non-negative percentage (got {0})")]
    InvalidThreshold(f64),

    #[error("traitor multiplier must be finite and non-negative (got {0})")]
    InvalidMultiplier(f64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    pub total_turns: u32,
    /// Error percentage at or above which the traitor takes the round
    pub error_threshold: f64,
    /// Applied to the traitor's score when they survive the vote
    pub traitor_multiplier: f64,
}

impl GameSettings {
    pub fn new(
        total_turns: u32,
        error_threshold: f64,
        traitor_multiplier: f64,
    ) -> Result<Self, SettingsError> {
        if total_turns == 0 {
            return Err(SettingsError::NoTurns);
        }
        if !error_threshold.is_finite() || error_threshold < 0.0 {
            return Err(SettingsError::InvalidThreshold(error_threshold));
        }
        if !traitor_multiplier.is_finite() || traitor_multiplier < 0.0 {
            return Err(SettingsError::InvalidMultiplier(traitor_multiplier));
        }
        Ok(Self {
            total_turns,
            error_threshold,
            traitor_multiplier,
        })
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            total_turns: 3,
            error_threshold: 10.0,
            traitor_multiplier: 2.0,
        }
    }
}

/// A catalog entry: prompt text and its numeric answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    #[serde(rename = "q")]
    pub prompt: String,
    #[serde(rename = "a")]
    pub answer: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub uid: Uid,
    pub name: String,
    pub ready: bool,
    pub score: i64,
    pub role: Role,
    pub connected: bool,
    /// Acknowledged "next" on the current result screen
    pub round_ready: bool,
    /// Acknowledged a reset of the whole room
    pub reset_ready: bool,
}

impl Participant {
    pub fn new(uid: Uid, name: String) -> Self {
        Self {
            uid,
            name,
            ready: false,
            score: 0,
            role: Role::Citizen,
            connected: true,
            round_ready: false,
            reset_ready: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Citizens,
    Traitor,
}

impl Winner {
    pub fn label(&self) -> &'static str {
        match self {
            Winner::Citizens => "Citizens",
            Winner::Traitor => "Traitor",
        }
    }
}

/// Outcome of the most recent answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResult {
    pub answer: f64,
    pub correct: f64,
    pub error: f64,
    pub winner: Winner,
    pub winner_label: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    System,
    Info,
    Result,
    Important,
    Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// A submitted answer as it arrives from the client: a JSON number or a string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    /// Numeric value of the answer, if it is a finite real number
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Answer::Number(n) => *n,
            Answer::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}
