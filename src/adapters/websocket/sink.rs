//! Channel-backed connection sink.
//!
//! The coordinator pushes into a bounded mpsc channel; the socket's writer
//! task drains it. `try_send` keeps delivery non-blocking, so a slow client
//! overflows its own buffer instead of stalling everyone else.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::ports::{ConnectionSink, DeliveryError, Outbound};

/// Outbound half of one WebSocket connection.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Outbound>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiver its writer task should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl ConnectionSink for ChannelSink {
    fn deliver(&self, outbound: Outbound) -> Result<(), DeliveryError> {
        self.tx.try_send(outbound).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backpressure,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
