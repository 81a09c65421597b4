//! HTTP handlers for station endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};

use crate::application::SessionCoordinator;

use super::dto::{StationSnapshot, StatsResponse};

/// Shared state for the station endpoints.
#[derive(Clone)]
pub struct StationAppState {
    pub coordinator: Arc<SessionCoordinator>,
}

impl StationAppState {
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self { coordinator }
    }
}

/// GET /api/status
pub async fn get_status(State(state): State<StationAppState>) -> Json<StationSnapshot> {
    Json(state.coordinator.snapshot().await)
}

/// GET /api/stats
pub async fn get_stats(State(state): State<StationAppState>) -> Json<StatsResponse> {
    Json(state.coordinator.snapshot().await.into())
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
