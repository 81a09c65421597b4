//! HTTP DTOs for station endpoints.
//!
//! Read-only surface. The status body is the domain snapshot as-is; stats
//! flattens it for dashboards that poll a single level of fields.

pub use crate::domain::station::StationSnapshot;

use serde::Serialize;

/// Response body for `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub listener_count: usize,
    pub peak_listeners: usize,
    pub is_live: bool,
    pub uptime_ms: u64,
}

impl From<StationSnapshot> for StatsResponse {
    fn from(snapshot: StationSnapshot) -> Self {
        Self {
            listener_count: snapshot.listener_count,
            peak_listeners: snapshot.stats.peak_listeners,
            is_live: snapshot.is_live,
            uptime_ms: snapshot.stats.uptime_ms,
        }
    }
}
