//! Station aggregate.
//!
//! Holds the broadcaster slot, the current track, listener membership, and
//! aggregate stats. All mutation goes through the session coordinator, which
//! serializes access; the aggregate itself is plain data.

use serde::Serialize;

use crate::domain::foundation::{ConnectionId, Timestamp};

use super::{AdmissionPolicy, ConnectionRole, ListenerSet, StationError, Track, TrackUpdate};

/// Outcome of a successful broadcaster admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The slot was empty; the station just went live.
    Fresh,
    /// The caller already held the slot.
    Reentry,
    /// The caller evicted the given broadcaster (replace policy only).
    Replaced(ConnectionId),
}

/// Station aggregate - single live source plus its audience.
///
/// # Invariants
///
/// - at most one broadcaster
/// - the listener set never contains the broadcaster
/// - `peak_listeners` never decreases and is at least the listener count
#[derive(Debug, Clone)]
pub struct Station {
    broadcaster: Option<ConnectionId>,
    current_track: Track,
    listeners: ListenerSet,
    peak_listeners: usize,
    started_at: Timestamp,
}

/// Status sent to clients in `status` and `status-update` frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStatus {
    pub is_live: bool,
    pub track: Track,
    pub listener_count: usize,
}

/// Aggregate counters for the HTTP status surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStats {
    pub peak_listeners: usize,
    pub uptime_ms: u64,
}

/// Full read-only view of the station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    pub is_live: bool,
    pub current_track: Track,
    pub listener_count: usize,
    pub stats: StationStats,
}

impl Station {
    /// Create an offline station showing `default_track`.
    pub fn new(default_track: Track, now: Timestamp) -> Self {
        Self {
            broadcaster: None,
            current_track: default_track,
            listeners: ListenerSet::new(),
            peak_listeners: 0,
            started_at: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_live(&self) -> bool {
        self.broadcaster.is_some()
    }

    pub fn broadcaster(&self) -> Option<ConnectionId> {
        self.broadcaster
    }

    pub fn is_broadcaster(&self, id: &ConnectionId) -> bool {
        self.broadcaster.as_ref() == Some(id)
    }

    pub fn current_track(&self) -> &Track {
        &self.current_track
    }

    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn peak_listeners(&self) -> usize {
        self.peak_listeners
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Broadcaster slot
    // ─────────────────────────────────────────────────────────────────────────

    /// Try to take the broadcaster slot.
    ///
    /// The track is validated before anything changes, so a rejected
    /// admission leaves the station untouched.
    ///
    /// # Errors
    ///
    /// - `AlreadyBroadcasting` if another connection holds the slot under
    ///   `AdmissionPolicy::Reject`
    /// - `InvalidTrack` if the supplied track fails validation
    /// - `RoleConflict` if `id` is currently a listener
    pub fn try_become_broadcaster(
        &mut self,
        id: ConnectionId,
        track: Option<&TrackUpdate>,
        policy: AdmissionPolicy,
        now: Timestamp,
    ) -> Result<Admission, StationError> {
        if self.listeners.contains(&id) {
            return Err(StationError::role_conflict(
                ConnectionRole::Listener,
                ConnectionRole::Broadcaster,
            ));
        }

        let admission = match self.broadcaster {
            None => Admission::Fresh,
            Some(current) if current == id => Admission::Reentry,
            Some(current) => match policy {
                AdmissionPolicy::Reject => return Err(StationError::AlreadyBroadcasting),
                AdmissionPolicy::Replace => Admission::Replaced(current),
            },
        };

        let track = track
            .map(|update| self.current_track.apply(update))
            .transpose()?;

        self.broadcaster = Some(id);
        if let Some(track) = track {
            self.current_track = track;
        }
        if admission != Admission::Reentry {
            self.started_at = now;
        }
        Ok(admission)
    }

    /// Replace the current track.
    ///
    /// # Errors
    ///
    /// - `NotBroadcaster` if `id` does not hold the slot
    /// - `InvalidTrack` if the result fails validation
    pub fn update_track(
        &mut self,
        id: &ConnectionId,
        update: &TrackUpdate,
    ) -> Result<&Track, StationError> {
        if !self.is_broadcaster(id) {
            return Err(StationError::NotBroadcaster);
        }
        self.current_track = self.current_track.apply(update)?;
        Ok(&self.current_track)
    }

    /// Give up the slot. Returns `true` if `id` was the broadcaster.
    pub fn relinquish_broadcast(&mut self, id: &ConnectionId) -> bool {
        if self.is_broadcaster(id) {
            self.broadcaster = None;
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `id` as a listener and return the new listener count.
    ///
    /// # Errors
    ///
    /// - `RoleConflict` if `id` is the broadcaster
    pub fn join_listener(&mut self, id: ConnectionId, now: Timestamp) -> Result<usize, StationError> {
        if self.is_broadcaster(&id) {
            return Err(StationError::role_conflict(
                ConnectionRole::Broadcaster,
                ConnectionRole::Listener,
            ));
        }
        self.listeners.join(id, now);
        self.peak_listeners = self.peak_listeners.max(self.listeners.len());
        Ok(self.listeners.len())
    }

    /// Remove `id` from the listener set. Returns `true` if it was a member.
    pub fn leave_listener(&mut self, id: &ConnectionId) -> bool {
        self.listeners.leave(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read models
    // ─────────────────────────────────────────────────────────────────────────

    pub fn status(&self) -> StationStatus {
        StationStatus {
            is_live: self.is_live(),
            track: self.current_track.clone(),
            listener_count: self.listener_count(),
        }
    }

    pub fn snapshot(&self, now: Timestamp) -> StationSnapshot {
        StationSnapshot {
            is_live: self.is_live(),
            current_track: self.current_track.clone(),
            listener_count: self.listener_count(),
            stats: StationStats {
                peak_listeners: self.peak_listeners,
                uptime_ms: now.millis_since(&self.started_at),
            },
        }
    }

    /// Drop the broadcaster and every listener. Used on shutdown.
    pub fn reset(&mut self) {
        self.broadcaster = None;
        self.listeners.clear();
    }
}
