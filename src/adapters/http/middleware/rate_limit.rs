//! Rate limiting middleware for axum.
//!
//! Every request on the wrapped routes is counted per client address.
//! Rate limit status is returned in standard HTTP headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Unix timestamp when the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use std::sync::Arc;
//!
//! let limiter = Arc::new(InMemoryRateLimiter::new(100, Duration::from_secs(900)));
//!
//! let app = Router::new()
//!     .route("/api/status", get(handler))
//!     .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitResult};

/// Rate limiter middleware state.
pub type RateLimiterState = Arc<InMemoryRateLimiter>;

/// Key shared by requests whose client address is unknown.
const UNKNOWN_CLIENT: &str = "unknown";

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    /// Maximum requests allowed in the window.
    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    /// Requests remaining in the current window.
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    /// Unix timestamp when the window resets.
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Count the request against its client's window.
///
/// Denied requests get 429 with a JSON body and `Retry-After`; allowed ones
/// pass through with the window status added to the response headers.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = extract_client_ip(request.headers(), connect_info.as_ref());
    let key = client_ip.as_deref().unwrap_or(UNKNOWN_CLIENT);

    match limiter.check(key).await {
        RateLimitResult::Denied(denied) => {
            tracing::debug!(
                client_ip = key,
                path = %request.uri().path(),
                retry_after_secs = denied.retry_after_secs,
                "Rate limit exceeded"
            );
            rate_limit_response(denied.limit, denied.reset_at, denied.retry_after_secs)
        }
        RateLimitResult::Allowed(status) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(
                response.headers_mut(),
                status.limit,
                status.remaining,
                status.reset_at,
            );
            response
        }
    }
}

/// Extract client IP from request, checking forwarded headers first.
///
/// Order of precedence:
/// 1. X-Forwarded-For header (first IP in list)
/// 2. X-Real-IP header
/// 3. ConnectInfo socket address
fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = real_ip {
        return Some(ip.to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

/// Create a 429 Too Many Requests response.
fn rate_limit_response(limit: u32, reset_at: u64, retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "Rate limit exceeded",
            "code": "RATE_LIMIT_EXCEEDED",
            "retry_after_secs": retry_after_secs
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    add_rate_limit_headers(headers, limit, 0, reset_at);
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

fn add_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_at: u64) {
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(remaining),
    );
    headers.insert(headers::X_RATELIMIT_RESET.clone(), HeaderValue::from(reset_at));
}
