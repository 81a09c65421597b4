//! Request rate limiting for the HTTP API.
//!
//! A single fixed-window limiter keyed by client address. The relay runs as
//! one process, so window state lives in memory.

mod in_memory;

pub use in_memory::InMemoryRateLimiter;

/// Outcome of counting one request against a key's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Window state after an allowed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// Unix seconds at which the current window ends.
    pub reset_at: u64,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Seconds until the window resets; at least 1.
    pub retry_after_secs: u64,
    /// Unix seconds at which the current window ends.
    pub reset_at: u64,
}
