//! Station module - the live source, its audience, and what is on air.
//!
//! # Module Organization
//!
//! - `aggregate` - `Station` with admission control and listener lifecycle
//! - `listeners` - listener membership set
//! - `track` - track metadata and partial updates
//! - `role` - connection roles and the admission policy
//! - `errors` - station errors

mod aggregate;
mod errors;
mod listeners;
mod role;
mod track;

pub use aggregate::{Admission, Station, StationSnapshot, StationStats, StationStatus};
pub use errors::StationError;
pub use listeners::ListenerSet;
pub use role::{AdmissionPolicy, ConnectionRole};
pub use track::{Track, TrackUpdate, MAX_COVER_LENGTH, MAX_TEXT_LENGTH};
