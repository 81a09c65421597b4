//! Station Relay - live audio session coordinator
//!
//! One broadcaster, many listeners. The server relays WebRTC signaling
//! between them and fans out station state (live flag, current track,
//! listener count) over WebSocket. Media never passes through here unless
//! binary relay is switched on.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
