//! Station HTTP adapter module.
//!
//! Read-only status endpoints polled by dashboards and health checks.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::StatsResponse;
pub use handlers::StationAppState;
pub use routes::{health_routes, station_routes};
