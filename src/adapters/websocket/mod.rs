//! WebSocket adapter for broadcaster and listener connections.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  text / binary   ┌──────────────┐  handle()   ┌────────────────────┐
//! │ Browser peer │ ───────────────► │  recv task   │ ──────────► │ SessionCoordinator │
//! └──────────────┘                  └──────────────┘             └────────────────────┘
//!        ▲                                                                │ deliver()
//!        │          ┌──────────────┐   bounded mpsc   ┌─────────────┐     │
//!        └───────── │  send task   │ ◄─────────────── │ ChannelSink │ ◄───┘
//!                   └──────────────┘                  └─────────────┘
//! ```
//!
//! # Components
//!
//! - [`handler`] - Axum WebSocket upgrade handler and per-socket tasks
//! - [`heartbeat`] - Ping/pong liveness tracking for the send task
//! - [`sink`] - Non-blocking outbound sink backed by a bounded channel

pub mod handler;
pub mod heartbeat;
pub mod sink;

pub use handler::{websocket_router, ws_handler, WebSocketState, WriterExit};
pub use heartbeat::HeartbeatSettings;
pub use sink::ChannelSink;
