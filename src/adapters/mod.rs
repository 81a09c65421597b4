//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the coordinator to the outside world:
//! - `websocket` - Axum WebSocket transport feeding the coordinator
//! - `http` - Read-only station endpoints, middleware, and the combined router
//! - `rate_limiter` - Fixed-window request counting for `/api/*`
//! - `memory` - Recording sink for tests

pub mod http;
pub mod memory;
pub mod rate_limiter;
pub mod websocket;

pub use http::{app_router, RouterOptions};
pub use websocket::{ChannelSink, HeartbeatSettings, WebSocketState};
