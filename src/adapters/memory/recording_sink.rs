//! In-memory connection sink for testing.
//!
//! Captures every delivered frame so tests can assert on what a client saw.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::protocol::ServerMessage;
use crate::ports::{ConnectionSink, DeliveryError, Outbound};

/// Connection sink that records frames instead of writing them.
///
/// Call [`RecordingSink::close`] to simulate a client that vanished
/// mid-broadcast; further deliveries then fail with `DeliveryError::Closed`.
///
/// # Example
///
/// ```ignore
/// let sink = Arc::new(RecordingSink::new());
/// let id = coordinator.connect(sink.clone()).await;
///
/// coordinator.handle(id, ClientMessage::GetStatus).await?;
/// assert_eq!(sink.kinds(), vec!["connected", "status"]);
/// ```
#[derive(Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<Outbound>>,
    closed: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every later delivery fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// All recorded frames, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn frames(&self) -> Vec<Outbound> {
        self.frames
            .lock()
            .expect("RecordingSink: frames lock poisoned")
            .clone()
    }

    /// Recorded text messages, oldest first.
    pub fn messages(&self) -> Vec<ServerMessage> {
        self.frames()
            .into_iter()
            .filter_map(|frame| match frame {
                Outbound::Message(msg) => Some(msg),
                Outbound::Audio(_) => None,
            })
            .collect()
    }

    /// Recorded binary frames, oldest first.
    pub fn audio(&self) -> Vec<Arc<[u8]>> {
        self.frames()
            .into_iter()
            .filter_map(|frame| match frame {
                Outbound::Audio(bytes) => Some(bytes),
                Outbound::Message(_) => None,
            })
            .collect()
    }

    /// Wire names of recorded text messages, oldest first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.messages().iter().map(ServerMessage::kind).collect()
    }

    /// How many recorded text messages have the given wire name.
    pub fn count_of(&self, kind: &str) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.frames
            .lock()
            .expect("RecordingSink: frames lock poisoned")
            .clear();
    }
}

impl ConnectionSink for RecordingSink {
    fn deliver(&self, outbound: Outbound) -> Result<(), DeliveryError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DeliveryError::Closed);
        }
        self.frames
            .lock()
            .expect("RecordingSink: frames lock poisoned")
            .push(outbound);
        Ok(())
    }
}
