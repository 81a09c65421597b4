//! HTTP routes for station endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{get_stats, get_status, health, StationAppState};

/// Creates the `/api` station router.
pub fn station_routes(state: StationAppState) -> Router {
    Router::new()
        // GET /api/status
        .route("/api/status", get(get_status))
        // GET /api/stats
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// Liveness check for load balancers. Never rate limited.
pub fn health_routes() -> Router {
    // GET /health
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::memory::RecordingSink;
    use crate::application::{CoordinatorSettings, SessionCoordinator};
    use crate::domain::protocol::ClientMessage;
    use crate::domain::station::{Track, TrackUpdate};

    fn coordinator() -> Arc<SessionCoordinator> {
        let track = Track::new("Idle", "Station", None).unwrap();
        Arc::new(SessionCoordinator::new(CoordinatorSettings::new(track)))
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn status_reports_offline_station() {
        let app = station_routes(StationAppState::new(coordinator()));

        let json = get_json(app, "/api/status").await;

        assert_eq!(json["isLive"], false);
        assert_eq!(json["currentTrack"]["title"], "Idle");
        assert_eq!(json["listenerCount"], 0);
        assert_eq!(json["stats"]["peakListeners"], 0);
    }

    #[tokio::test]
    async fn stats_follow_live_session() {
        let coordinator = coordinator();
        let broadcaster = coordinator.connect(RecordingSink::shared()).await;
        let listener = coordinator.connect(RecordingSink::shared()).await;
        coordinator
            .handle(
                broadcaster,
                ClientMessage::BroadcasterConnect {
                    track: Some(TrackUpdate::full("Night Drive", "Kavinsky")),
                },
            )
            .await
            .unwrap();
        coordinator
            .handle(listener, ClientMessage::ListenerConnect)
            .await
            .unwrap();
        let app = station_routes(StationAppState::new(coordinator.clone()));

        let stats = get_json(app.clone(), "/api/stats").await;
        let status = get_json(app, "/api/status").await;

        assert_eq!(stats["isLive"], true);
        assert_eq!(stats["listenerCount"], 1);
        assert_eq!(stats["peakListeners"], 1);
        assert!(stats["uptimeMs"].is_u64());
        assert_eq!(status["currentTrack"]["artist"], "Kavinsky");
    }

    #[tokio::test]
    async fn health_is_plain_ok() {
        let app = health_routes();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }
}
