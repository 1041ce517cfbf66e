use crate::state::RoomView;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register, or reclaim a previous seat by uid
    Join {
        #[serde(default)]
        name: Option<String>,
        uid: Uid,
    },
    UpdateSettings {
        turns: u32,
        threshold: f64,
        multiplier: f64,
    },
    ToggleReady,
    SubmitAnswer {
        answer: Answer,
    },
    AdvanceAcknowledge,
    Vote {
        target_uid: Uid,
    },
    ResetAcknowledge,
    Chat {
        msg: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every socket
    Welcome {
        protocol: String,
        connection_id: ConnectionId,
        server_now: String,
        state: RoomView,
    },
    /// Sent only to the joining socket
    YourInfo { sid: ConnectionId, uid: Uid },
    /// Full snapshot after every accepted event
    UpdateState(RoomView),
}
