//! Errors surfaced by the session coordinator.

use thiserror::Error;

use crate::domain::foundation::{ConnectionId, ErrorCode};
use crate::domain::protocol::DecodeError;
use crate::domain::station::StationError;

/// Everything that can go wrong while handling one client message.
///
/// None of these are fatal: the connection stays open and global state is
/// unchanged by the failed step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Station(#[from] StationError),

    /// Signaling target disconnected in the interim. Dropped silently.
    #[error("signal target {0} is not connected")]
    UnknownTarget(ConnectionId),

    /// Message from a connection that was already torn down.
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl SessionError {
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        SessionError::ProtocolViolation(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        SessionError::MalformedMessage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Station(err) => err.code(),
            SessionError::UnknownTarget(_) => ErrorCode::UnknownTarget,
            SessionError::UnknownConnection(_) => ErrorCode::UnknownConnection,
            SessionError::ProtocolViolation(_) => ErrorCode::ProtocolViolation,
            SessionError::MalformedMessage(_) => ErrorCode::MalformedMessage,
        }
    }

    /// Whether the offending client is told about this error.
    ///
    /// Malformed frames are logged and dropped so a noisy client cannot
    /// turn the server into an echo.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            SessionError::Station(_) | SessionError::ProtocolViolation(_)
        )
    }
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        SessionError::malformed(err.to_string())
    }
}
