//! Application layer - session coordination.
//!
//! Orchestrates the station aggregate, the connection registry, and the
//! outbound sinks. All state lives behind the coordinator's lock.

mod coordinator;
mod errors;
mod notifier;
mod registry;
mod router;

pub use coordinator::{CoordinatorSettings, SessionCoordinator};
pub use errors::SessionError;
pub use notifier::{FanOut, NotificationBus};
pub use registry::{Connection, ConnectionRegistry};
pub use router::{RouteFailure, SenderStanding, SignalingRouter};
