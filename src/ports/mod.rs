//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `ConnectionSink` - non-blocking outbound channel to one client

mod connection_sink;

pub use connection_sink::{ConnectionSink, DeliveryError, Outbound};
