//! In-memory fixed-window rate limiter.
//!
//! Each key gets a counter that resets when its window expires. Expired
//! windows are swept once the map grows past a threshold.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;

use super::{RateLimitDenied, RateLimitResult, RateLimitStatus};

/// Number of tracked keys that triggers a sweep of expired windows.
const SWEEP_THRESHOLD: usize = 10_000;

/// Fixed-window counter shared by every request on the limited routes.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    limit: u32,
    window_secs: u64,
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// Unix seconds at which the current window started.
    window_start: u64,
}

impl InMemoryRateLimiter {
    /// Allow `limit` requests per key in every `window`.
    ///
    /// Windows shorter than a second are rounded up to one second.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window_secs: window.as_secs().max(1),
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Count one request for `key` against the current window.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Timestamp::now().as_unix_secs()).await
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    async fn check_at(&self, key: &str, now: u64) -> RateLimitResult {
        let mut windows = self.windows.write().await;

        if windows.len() >= SWEEP_THRESHOLD {
            let window_secs = self.window_secs;
            windows.retain(|_, state| now < state.window_start + window_secs);
        }

        let state = windows.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        if now >= state.window_start + self.window_secs {
            state.count = 0;
            state.window_start = now;
        }
        let reset_at = state.window_start + self.window_secs;

        if state.count >= self.limit {
            return RateLimitResult::Denied(RateLimitDenied {
                limit: self.limit,
                retry_after_secs: reset_at.saturating_sub(now).max(1),
                reset_at,
            });
        }

        state.count += 1;
        RateLimitResult::Allowed(RateLimitStatus {
            limit: self.limit,
            remaining: self.limit.saturating_sub(state.count),
            reset_at,
        })
    }
}
