//! HTTP adapters - REST endpoints, middleware, and the combined application router.

pub mod middleware;
pub mod station;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Method};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::rate_limiter::InMemoryRateLimiter;
use crate::adapters::websocket::{websocket_router, HeartbeatSettings, WebSocketState};
use crate::application::SessionCoordinator;

use self::middleware::{rate_limit_middleware, RateLimiterState};

pub use station::{health_routes, station_routes, StationAppState, StatsResponse};

/// Transport and HTTP settings for [`app_router`].
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Per-connection outbound queue capacity.
    pub outbound_buffer: usize,
    pub heartbeat: HeartbeatSettings,
    /// Allowed browser origins; empty allows any.
    pub cors_origins: Vec<String>,
    /// Requests per client per window on `/api/*`; `None` disables limiting.
    pub api_rate_limit: Option<(u32, Duration)>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            outbound_buffer: 256,
            heartbeat: HeartbeatSettings::default(),
            cors_origins: Vec::new(),
            api_rate_limit: Some((100, Duration::from_secs(15 * 60))),
        }
    }
}

/// Build the full application: `/ws`, the station endpoints, tracing, and CORS.
///
/// HTTP responses are gzip-compressed when the client accepts it. `/api/*`
/// is rate limited per client address; `/health` and `/ws` are not.
pub fn app_router(coordinator: Arc<SessionCoordinator>, options: &RouterOptions) -> Router {
    let ws = websocket_router().with_state(WebSocketState::new(
        coordinator.clone(),
        options.outbound_buffer,
        options.heartbeat,
    ));

    let mut api = station_routes(StationAppState::new(coordinator));
    if let Some((limit, window)) = options.api_rate_limit {
        let limiter: RateLimiterState = Arc::new(InMemoryRateLimiter::new(limit, window));
        api = api.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let http_routes = Router::new()
        .merge(api)
        .merge(health_routes())
        .layer(CompressionLayer::new());

    Router::new()
        .merge(ws)
        .merge(http_routes)
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
