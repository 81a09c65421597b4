//! Station-specific error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

use super::ConnectionRole;

/// Errors raised by station state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    /// A different connection already holds the broadcaster slot.
    #[error("Another broadcaster is already live")]
    AlreadyBroadcasting,

    /// A broadcaster-only action came from someone else.
    #[error("Only the active broadcaster can do that")]
    NotBroadcaster,

    /// The connection already registered with a different role.
    #[error("Connection is registered as {current} and cannot become {requested}")]
    RoleConflict {
        current: ConnectionRole,
        requested: ConnectionRole,
    },

    /// Track metadata failed validation.
    #[error("Invalid track: {0}")]
    InvalidTrack(#[from] ValidationError),
}

impl StationError {
    pub fn role_conflict(current: ConnectionRole, requested: ConnectionRole) -> Self {
        StationError::RoleConflict { current, requested }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StationError::AlreadyBroadcasting => ErrorCode::AlreadyBroadcasting,
            StationError::NotBroadcaster => ErrorCode::NotBroadcaster,
            StationError::RoleConflict { .. } => ErrorCode::RoleConflict,
            StationError::InvalidTrack(_) => ErrorCode::InvalidTrack,
        }
    }
}
