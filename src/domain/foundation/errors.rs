//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' exceeds {max} characters")]
    TooLong { field: String, max: usize },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
        }
    }
}

/// Error codes sent to clients in `error` frames and used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Admission / role errors
    AlreadyBroadcasting,
    NotBroadcaster,
    RoleConflict,

    // Validation errors
    InvalidTrack,
    MalformedMessage,

    // Routing errors
    UnknownTarget,
    UnknownConnection,
    ProtocolViolation,
}

impl ErrorCode {
    /// Wire representation, e.g. `ALREADY_BROADCASTING`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AlreadyBroadcasting => "ALREADY_BROADCASTING",
            ErrorCode::NotBroadcaster => "NOT_BROADCASTER",
            ErrorCode::RoleConflict => "ROLE_CONFLICT",
            ErrorCode::InvalidTrack => "INVALID_TRACK",
            ErrorCode::MalformedMessage => "MALFORMED_MESSAGE",
            ErrorCode::UnknownTarget => "UNKNOWN_TARGET",
            ErrorCode::UnknownConnection => "UNKNOWN_CONNECTION",
            ErrorCode::ProtocolViolation => "PROTOCOL_VIOLATION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
