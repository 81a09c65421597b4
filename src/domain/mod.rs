//! Domain layer containing station logic and the wire vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors)
//! - `station` - Broadcaster slot, listeners, track, and stats
//! - `protocol` - Client and server message types

pub mod foundation;
pub mod protocol;
pub mod station;
