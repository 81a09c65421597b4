//! Wire protocol spoken over the WebSocket.
//!
//! - Client → Server: registration, track updates, status requests, signaling
//! - Server → Client: acknowledgements, signaling relays, station notifications

mod client;
mod server;

pub use client::{ClientMessage, DecodeError, InboundSignal};
pub use server::{ServerMessage, SignalRelay};

use serde::{Deserialize, Serialize};

/// Kinds of signaling envelope a client may address to a peer.
///
/// The `watcher` envelope is produced by the coordinator itself and is not
/// accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "offer" => Some(SignalKind::Offer),
            "answer" => Some(SignalKind::Answer),
            "candidate" => Some(SignalKind::Candidate),
            _ => None,
        }
    }
}
