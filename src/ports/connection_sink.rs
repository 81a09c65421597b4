//! ConnectionSink port - outbound half of a client connection.
//!
//! The coordinator never touches sockets. Each registered connection hands it
//! a sink; delivering to the sink must not block, so the coordinator can call
//! it while holding its state lock and per-connection order follows state order.
//!
//! ## Implementations
//!
//! - `adapters::websocket::ChannelSink` - bounded mpsc feeding the socket writer
//! - `adapters::memory::RecordingSink` - captures messages for tests

use std::sync::Arc;

use crate::domain::protocol::ServerMessage;

/// Something the coordinator wants written to a client.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// JSON text frame.
    Message(ServerMessage),
    /// Opaque binary frame (binary relay mode).
    Audio(Arc<[u8]>),
}

impl Outbound {
    /// The message, if this is a text frame.
    pub fn as_message(&self) -> Option<&ServerMessage> {
        match self {
            Outbound::Message(msg) => Some(msg),
            Outbound::Audio(_) => None,
        }
    }
}

impl From<ServerMessage> for Outbound {
    fn from(msg: ServerMessage) -> Self {
        Outbound::Message(msg)
    }
}

/// Why a delivery failed. Either way the connection is pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The client's writer is gone.
    #[error("connection closed")]
    Closed,

    /// The client is not draining its outbound buffer.
    #[error("outbound buffer full")]
    Backpressure,
}

/// Port for pushing frames to one client without blocking.
pub trait ConnectionSink: Send + Sync {
    /// Queue a frame for the client.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the frame cannot be queued.
    fn deliver(&self, outbound: Outbound) -> Result<(), DeliveryError>;
}
