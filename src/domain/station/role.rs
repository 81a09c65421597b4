//! Connection roles and the admission policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a connection registered as.
///
/// Starts as `Unassigned` and is set once by the first valid registration
/// message. Switching between `Broadcaster` and `Listener` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    #[default]
    Unassigned,
    Broadcaster,
    Listener,
}

impl ConnectionRole {
    /// Whether a connection holding `self` may take on `requested`.
    pub fn can_become(&self, requested: ConnectionRole) -> bool {
        matches!(
            (self, requested),
            (ConnectionRole::Unassigned, _)
                | (ConnectionRole::Broadcaster, ConnectionRole::Broadcaster)
                | (ConnectionRole::Listener, ConnectionRole::Listener)
        )
    }
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionRole::Unassigned => "unassigned",
            ConnectionRole::Broadcaster => "broadcaster",
            ConnectionRole::Listener => "listener",
        };
        write!(f, "{}", s)
    }
}

/// What happens when a second connection asks for the broadcaster slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// The newcomer is told another broadcaster is active.
    #[default]
    Reject,
    /// The newcomer takes over and the previous broadcaster is evicted.
    Replace,
}
