//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidHost(String),

    #[error("Outbound buffer must be between 1 and {max}")]
    InvalidOutboundBuffer { max: usize },

    #[error("Heartbeat interval must be positive and not exceed the timeout (interval {interval}s, timeout {timeout}s)")]
    InvalidHeartbeat { interval: u64, timeout: u64 },

    #[error("Rate limit window must be positive")]
    InvalidRateLimitWindow,

    #[error("Invalid default track: {0}")]
    InvalidDefaultTrack(String),
}
