//! In-memory adapters for tests and local tooling.

mod recording_sink;

pub use recording_sink::RecordingSink;
