//! Signaling router - addressed relay of offer/answer/candidate envelopes.
//!
//! Routing is by address only. The payload is never inspected. With strict
//! signaling enabled the sender's current station standing is checked against
//! the envelope kind.

use serde_json::value::RawValue;

use crate::domain::foundation::ConnectionId;
use crate::domain::protocol::{ServerMessage, SignalKind};

use super::errors::SessionError;
use super::registry::ConnectionRegistry;

/// Why an envelope was not handed to the target's sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    /// Rejected before delivery; state untouched.
    Rejected(SessionError),
    /// The target's sink refused the frame; prune it.
    Undeliverable(ConnectionId),
}

/// What the sender currently holds on the station.
///
/// Taken from the station aggregate, not the registry role: a broadcaster that
/// relinquished or was replaced keeps its role label but no longer holds the slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStanding {
    /// Sender occupies the broadcaster slot.
    pub on_air: bool,
    /// Sender is in the listener set.
    pub listening: bool,
}

impl SenderStanding {
    pub fn new(on_air: bool, listening: bool) -> Self {
        Self { on_air, listening }
    }

    fn describe(&self) -> &'static str {
        match (self.on_air, self.listening) {
            (true, _) => "broadcaster",
            (false, true) => "listener",
            (false, false) => "connection without a station slot",
        }
    }
}

/// Relays signaling envelopes between exactly two parties.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalingRouter {
    strict: bool,
}

impl SignalingRouter {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Forward `{kind, senderId, payload}` to `target`.
    ///
    /// # Errors
    ///
    /// - `Rejected(ProtocolViolation)` if strict and the sender's standing may not send `kind`
    /// - `Rejected(UnknownTarget)` if `target` is not registered
    /// - `Undeliverable` if the target's sink failed
    pub fn route(
        &self,
        registry: &ConnectionRegistry,
        sender: ConnectionId,
        standing: SenderStanding,
        kind: SignalKind,
        target: ConnectionId,
        payload: Box<RawValue>,
    ) -> Result<(), RouteFailure> {
        if self.strict {
            check_standing(standing, kind).map_err(RouteFailure::Rejected)?;
        }

        let Some(conn) = registry.get(&target) else {
            return Err(RouteFailure::Rejected(SessionError::UnknownTarget(target)));
        };

        conn.sink()
            .deliver(ServerMessage::signal(kind, sender, payload).into())
            .map_err(|_| RouteFailure::Undeliverable(target))
    }
}

fn check_standing(standing: SenderStanding, kind: SignalKind) -> Result<(), SessionError> {
    let allowed = match kind {
        SignalKind::Offer => standing.on_air,
        SignalKind::Answer => standing.listening,
        SignalKind::Candidate => standing.on_air || standing.listening,
    };
    if allowed {
        Ok(())
    } else {
        Err(SessionError::protocol_violation(format!(
            "{} may not send {}",
            standing.describe(),
            kind.as_str()
        )))
    }
}
