//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, time values, and error types that form the
//! vocabulary of the station domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::ConnectionId;
pub use timestamp::Timestamp;
