//! Server → Client messages.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::domain::foundation::{ConnectionId, ErrorCode, Timestamp};
use crate::domain::station::{StationStatus, Track};

use super::SignalKind;

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Greeting carrying the id other peers use to address this client.
    #[serde(rename_all = "camelCase")]
    Connected {
        client_id: ConnectionId,
        timestamp: String,
    },

    /// The sender now holds the broadcaster slot.
    BroadcasterConfirmed { track: Track },

    /// The sender lost the broadcaster slot to a newcomer.
    BroadcasterReplaced {},

    /// Reply to `listener-connect`.
    #[serde(rename_all = "camelCase")]
    ListenerReady { is_live: bool, track: Track },

    /// A listener needs an offer from the broadcaster.
    Watcher { id: ConnectionId },

    Offer(SignalRelay),
    Answer(SignalRelay),
    Candidate(SignalRelay),

    /// Reply to `get-status`.
    Status(StationStatus),

    /// Station went live or offline.
    StatusUpdate(StationStatus),

    ListenersUpdate { count: usize },

    TrackUpdate { track: Track },

    BroadcasterConnected { track: Track },

    BroadcasterDisconnected {},

    Error { code: String, message: String },

    /// Heartbeat response.
    Pong { timestamp: String },
}

/// Signaling envelope as forwarded; `payload` is the sender's JSON untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRelay {
    pub sender_id: ConnectionId,
    pub payload: Box<RawValue>,
}

impl ServerMessage {
    pub fn connected(client_id: ConnectionId) -> Self {
        ServerMessage::Connected {
            client_id,
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }

    pub fn signal(kind: SignalKind, sender_id: ConnectionId, payload: Box<RawValue>) -> Self {
        let relay = SignalRelay { sender_id, payload };
        match kind {
            SignalKind::Offer => ServerMessage::Offer(relay),
            SignalKind::Answer => ServerMessage::Answer(relay),
            SignalKind::Candidate => ServerMessage::Candidate(relay),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn pong() -> Self {
        ServerMessage::Pong {
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }

    /// Wire name of the message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Connected { .. } => "connected",
            ServerMessage::BroadcasterConfirmed { .. } => "broadcaster-confirmed",
            ServerMessage::BroadcasterReplaced {} => "broadcaster-replaced",
            ServerMessage::ListenerReady { .. } => "listener-ready",
            ServerMessage::Watcher { .. } => "watcher",
            ServerMessage::Offer(_) => "offer",
            ServerMessage::Answer(_) => "answer",
            ServerMessage::Candidate(_) => "candidate",
            ServerMessage::Status(_) => "status",
            ServerMessage::StatusUpdate(_) => "status-update",
            ServerMessage::ListenersUpdate { .. } => "listeners-update",
            ServerMessage::TrackUpdate { .. } => "track-update",
            ServerMessage::BroadcasterConnected { .. } => "broadcaster-connected",
            ServerMessage::BroadcasterDisconnected {} => "broadcaster-disconnected",
            ServerMessage::Error { .. } => "error",
            ServerMessage::Pong { .. } => "pong",
        }
    }

    /// Serialize for a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
