mod game;
mod player;
mod round;
mod view;
mod vote;

pub use round::error_percent;
pub use view::{ParticipantView, QuestionView, RoomView};
pub use vote::leading_suspects;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::protocol::ServerMessage;
use crate::rng::{Picker, RandomPicker};
use crate::types::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Players needed before a ready lobby starts the game
pub const MIN_PLAYERS: usize = 3;

/// Why an inbound event was ignored.
///
/// Rejections never reach the client; the room is left untouched and
/// nothing is broadcast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("connection has not joined")]
    UnknownConnection,

    #[error("not allowed during {actual:?}")]
    WrongPhase { actual: Phase },

    #[error("only the current answerer may submit")]
    NotAnswerer,

    #[error("answer is not a finite number")]
    MalformedAnswer,

    #[error("uid must not be empty")]
    MissingUid,

    #[error("display name must not be empty")]
    MissingName,

    #[error("connection already belongs to another player")]
    ConnectionTaken,

    #[error("players cannot vote for themselves")]
    SelfVote,

    #[error("no player with uid {0}")]
    UnknownTarget(Uid),

    #[error("chat message is empty")]
    EmptyMessage,

    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

/// Result of applying one inbound event to the room
pub type Outcome = Result<(), Rejection>;

/// Authoritative state of one game room.
///
/// Every operation is synchronous and either fully applies or returns a
/// [`Rejection`] without touching anything.
pub struct Room {
    catalog: Catalog,
    picker: Box<dyn Picker>,
    /// Settings restored on every reset
    default_settings: GameSettings,

    settings: GameSettings,
    phase: Phase,
    participants: BTreeMap<ConnectionId, Participant>,
    /// Enforces one live record per uid
    connection_by_uid: HashMap<Uid, ConnectionId>,
    current_turn: u32,
    questions: Vec<Question>,
    current_question: Option<Question>,
    answerer: Option<Uid>,
    traitor: Option<Uid>,
    votes: BTreeMap<ConnectionId, Uid>,
    last_result: Option<RoundResult>,
    log: Vec<LogEntry>,
}

impl Room {
    pub fn new(catalog: Catalog, settings: GameSettings, picker: Box<dyn Picker>) -> Self {
        Self {
            catalog,
            picker,
            default_settings: settings,
            settings,
            phase: Phase::Lobby,
            participants: BTreeMap::new(),
            connection_by_uid: HashMap::new(),
            current_turn: 0,
            questions: Vec::new(),
            current_question: None,
            answerer: None,
            traitor: None,
            votes: BTreeMap::new(),
            last_result: None,
            log: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Questions drawn for the running game
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn answerer(&self) -> Option<&Uid> {
        self.answerer.as_ref()
    }

    pub fn traitor(&self) -> Option<&Uid> {
        self.traitor.as_ref()
    }

    pub fn votes(&self) -> &BTreeMap<ConnectionId, Uid> {
        &self.votes
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn participants(&self) -> &BTreeMap<ConnectionId, Participant> {
        &self.participants
    }

    pub fn participant(&self, connection: &str) -> Option<&Participant> {
        self.participants.get(connection)
    }

    /// Current connection id and record for a uid
    pub fn participant_by_uid(&self, uid: &str) -> Option<(&ConnectionId, &Participant)> {
        let connection = self.connection_by_uid.get(uid)?;
        self.participants.get_key_value(connection)
    }

    pub fn connected_count(&self) -> usize {
        self.participants.values().filter(|p| p.connected).count()
    }

    fn participant_mut(&mut self, connection: &str) -> Result<&mut Participant, Rejection> {
        self.participants
            .get_mut(connection)
            .ok_or(Rejection::UnknownConnection)
    }

    fn participant_by_uid_mut(&mut self, uid: &str) -> Option<&mut Participant> {
        let connection = self.connection_by_uid.get(uid)?;
        self.participants.get_mut(connection)
    }

    fn require_phase(&self, allowed: &[Phase]) -> Result<(), Rejection> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(Rejection::WrongPhase { actual: self.phase })
        }
    }

    /// True when every connected participant satisfies `check`
    fn all_connected(&self, check: impl Fn(&Participant) -> bool) -> bool {
        self.participants
            .values()
            .filter(|p| p.connected)
            .all(check)
    }

    fn add_log(&mut self, msg: impl Into<String>, kind: LogKind) {
        self.log.push(LogEntry {
            msg: msg.into(),
            kind,
        });
    }
}

/// Caps applied to free-text input before it reaches the room
#[derive(Debug, Clone, Copy)]
pub struct InputLimits {
    pub max_name_chars: usize,
    pub max_chat_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        let config = ServerConfig::default();
        Self {
            max_name_chars: config.max_name_chars,
            max_chat_chars: config.max_chat_chars,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single serialization point for all room mutations
    pub room: Arc<Mutex<Room>>,
    /// Broadcast channel for sending state snapshots to every socket
    pub broadcast: broadcast::Sender<ServerMessage>,
    pub limits: InputLimits,
}

impl AppState {
    pub fn new(room: Room) -> Self {
        Self::with_limits(room, InputLimits::default())
    }

    pub fn with_limits(room: Room, limits: InputLimits) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            room: Arc::new(Mutex::new(room)),
            broadcast: tx,
            limits,
        }
    }

    pub fn from_config(config: &ServerConfig, catalog: Catalog) -> Self {
        let picker: Box<dyn Picker> = match config.rng_seed {
            Some(seed) => {
                tracing::info!("Using fixed RNG seed {}", seed);
                Box::new(RandomPicker::seeded(seed))
            }
            None => Box::new(RandomPicker::new()),
        };
        let room = Room::new(catalog, config.default_settings, picker);
        Self::with_limits(
            room,
            InputLimits {
                max_name_chars: config.max_name_chars,
                max_chat_chars: config.max_chat_chars,
            },
        )
    }

    /// Send the room's current view to all sockets.
    ///
    /// Called with the room lock held so snapshots go out in mutation order.
    pub fn broadcast_view(&self, room: &Room) {
        // Ignore send errors (no sockets connected is fine)
        let _ = self.broadcast.send(ServerMessage::UpdateState(room.view()));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Room::new(
            Catalog::builtin(),
            GameSettings::default(),
            Box::new(RandomPicker::new()),
        ))
    }
}
