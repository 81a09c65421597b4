//! Session coordinator - the station's message-handling state machine.
//!
//! Composes the connection registry, station aggregate, signaling router,
//! and notification bus behind a single lock:
//!
//! ```text
//!                ┌──────────────────── Mutex<SessionState> ────────────────────┐
//!  socket A ──►  │  ConnectionRegistry   Station (slot, track, listeners)      │ ──► sink A
//!  socket B ──►  │  SignalingRouter ──► addressed relay                        │ ──► sink B
//!  socket C ──►  │  NotificationBus ──► fan-out, failures queued for pruning   │ ──► sink C
//!                └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every state transition happens with the lock held, so compound
//! read-modify-write steps (admission, listener counting) are atomic with
//! respect to concurrent connects and disconnects. Sinks never block, so
//! delivering under the lock is cheap and keeps each client's frames in the
//! same order as the state changes that produced them.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::protocol::{ClientMessage, InboundSignal, ServerMessage};
use crate::domain::station::{
    Admission, AdmissionPolicy, ConnectionRole, Station, StationError, StationSnapshot,
    StationStatus, Track, TrackUpdate,
};
use crate::ports::ConnectionSink;

use super::errors::SessionError;
use super::notifier::NotificationBus;
use super::registry::ConnectionRegistry;
use super::router::{RouteFailure, SenderStanding, SignalingRouter};

/// Behaviour switches for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub admission_policy: AdmissionPolicy,
    pub binary_relay: bool,
    pub strict_signaling: bool,
    pub default_track: Track,
}

impl CoordinatorSettings {
    /// Reject policy, binary relay off, permissive signaling.
    pub fn new(default_track: Track) -> Self {
        Self {
            admission_policy: AdmissionPolicy::Reject,
            binary_relay: false,
            strict_signaling: false,
            default_track,
        }
    }

    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.admission_policy = policy;
        self
    }

    pub fn with_binary_relay(mut self, enabled: bool) -> Self {
        self.binary_relay = enabled;
        self
    }

    pub fn with_strict_signaling(mut self, enabled: bool) -> Self {
        self.strict_signaling = enabled;
        self
    }
}

/// Owns all station state for the lifetime of the process.
pub struct SessionCoordinator {
    state: Mutex<SessionState>,
    settings: CoordinatorSettings,
    router: SignalingRouter,
}

impl SessionCoordinator {
    pub fn new(settings: CoordinatorSettings) -> Self {
        let station = Station::new(settings.default_track.clone(), Timestamp::now());
        Self {
            state: Mutex::new(SessionState {
                registry: ConnectionRegistry::new(),
                station,
                pruned: Vec::new(),
            }),
            router: SignalingRouter::new(settings.strict_signaling),
            settings,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Register a new connection and greet it with its id.
    pub async fn connect(&self, sink: Arc<dyn ConnectionSink>) -> ConnectionId {
        let id = ConnectionId::new();
        let mut state = self.state.lock().await;

        state.registry.register(id, sink, Timestamp::now());
        state.send(&id, ServerMessage::connected(id));
        state.drain_pruned();

        info!(
            client_id = %id,
            connections = state.registry.len(),
            "Client connected"
        );
        id
    }

    /// Process one decoded message from `id`.
    ///
    /// User-visible errors are also sent back to the client as an `error`
    /// frame; the returned error is for logging.
    pub async fn handle(&self, id: ConnectionId, message: ClientMessage) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        if !state.registry.exists(&id) {
            return Err(SessionError::UnknownConnection(id));
        }

        let result = match message {
            ClientMessage::BroadcasterConnect { track } => {
                state.become_broadcaster(id, track, self.settings.admission_policy)
            }
            ClientMessage::ListenerConnect => state.join_listener(id),
            ClientMessage::ListenerDisconnect => {
                state.leave_listener(id);
                Ok(())
            }
            ClientMessage::TrackUpdate(update) => state.update_track(id, update),
            ClientMessage::GetStatus => {
                let status = state.station.status();
                state.send(&id, ServerMessage::Status(status));
                Ok(())
            }
            ClientMessage::Signal(signal) => state.route_signal(&self.router, id, signal),
            ClientMessage::BroadcasterDisconnect => {
                state.relinquish(id);
                Ok(())
            }
            ClientMessage::Ping => {
                state.send(&id, ServerMessage::pong());
                Ok(())
            }
        };

        if let Err(err) = &result {
            if err.is_reported() {
                state.send(&id, ServerMessage::error(err.code(), err.to_string()));
            }
        }
        state.drain_pruned();
        result
    }

    /// Forward a binary frame from the broadcaster to every listener.
    ///
    /// Returns how many listeners the frame was queued for. Rejections are
    /// not echoed to the sender.
    pub async fn relay_audio(&self, id: ConnectionId, frame: Arc<[u8]>) -> Result<usize, SessionError> {
        if !self.settings.binary_relay {
            return Err(SessionError::protocol_violation("binary relay is disabled"));
        }

        let mut state = self.state.lock().await;
        if !state.registry.exists(&id) {
            return Err(SessionError::UnknownConnection(id));
        }
        if !state.station.is_broadcaster(&id) {
            return Err(StationError::NotBroadcaster.into());
        }

        let fan_out = {
            let SessionState {
                registry, station, ..
            } = &*state;
            NotificationBus::relay_audio(registry, station.listeners().ids(), frame)
        };
        state.pruned.extend(fan_out.failed);
        state.drain_pruned();
        Ok(fan_out.delivered)
    }

    /// Tear down a connection and reconcile station state.
    ///
    /// Returns `false` if the connection was already gone, so a socket that
    /// was pruned earlier is not processed twice.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.disconnect(id);
        state.drain_pruned();
        if removed {
            info!(
                client_id = %id,
                connections = state.registry.len(),
                "Client disconnected"
            );
        }
        removed
    }

    pub async fn status(&self) -> StationStatus {
        self.state.lock().await.station.status()
    }

    pub async fn snapshot(&self) -> StationSnapshot {
        self.state.lock().await.station.snapshot(Timestamp::now())
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    pub async fn role_of(&self, id: &ConnectionId) -> Option<ConnectionRole> {
        self.state.lock().await.registry.role(id)
    }

    /// Drop every connection and take the station offline.
    ///
    /// Dropping a connection drops its sink, which ends the socket's writer.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.station.reset();
        let closed = state.registry.clear();
        state.pruned.clear();
        info!(connections = closed, "Session coordinator shut down");
    }
}

/// Everything guarded by the coordinator lock.
struct SessionState {
    registry: ConnectionRegistry,
    station: Station,
    /// Connections whose sink failed; torn down after the current step.
    pruned: Vec<ConnectionId>,
}

impl SessionState {
    // ─────────────────────────────────────────────────────────────────────────
    // Delivery
    // ─────────────────────────────────────────────────────────────────────────

    fn send(&mut self, id: &ConnectionId, message: ServerMessage) {
        if !NotificationBus::send_to(&self.registry, id, message) {
            self.pruned.push(*id);
        }
    }

    fn broadcast(&mut self, message: ServerMessage, except: Option<&ConnectionId>) {
        let fan_out = NotificationBus::broadcast(&self.registry, &message, except);
        self.pruned.extend(fan_out.failed);
    }

    /// Tear down every connection whose sink failed, including any that fail
    /// while notifying about those teardowns.
    fn drain_pruned(&mut self) {
        while let Some(id) = self.pruned.pop() {
            if self.disconnect(id) {
                warn!(client_id = %id, "Pruned unreachable connection");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn role(&self, id: &ConnectionId) -> Result<ConnectionRole, SessionError> {
        self.registry
            .role(id)
            .ok_or(SessionError::UnknownConnection(*id))
    }

    fn become_broadcaster(
        &mut self,
        id: ConnectionId,
        track: Option<TrackUpdate>,
        policy: AdmissionPolicy,
    ) -> Result<(), SessionError> {
        let role = self.role(&id)?;
        if !role.can_become(ConnectionRole::Broadcaster) {
            return Err(StationError::role_conflict(role, ConnectionRole::Broadcaster).into());
        }

        let previous_track = self.station.current_track().clone();
        let admission =
            self.station
                .try_become_broadcaster(id, track.as_ref(), policy, Timestamp::now())?;
        self.registry.assign_role(&id, ConnectionRole::Broadcaster)?;
        let track = self.station.current_track().clone();

        if let Admission::Replaced(previous) = admission {
            info!(client_id = %id, replaced = %previous, "Broadcaster replaced");
            self.send(&previous, ServerMessage::BroadcasterReplaced {});
        }
        self.send(&id, ServerMessage::BroadcasterConfirmed { track: track.clone() });

        match admission {
            Admission::Reentry => {
                debug!(client_id = %id, "Broadcaster re-entered");
                if track != previous_track {
                    self.broadcast(ServerMessage::TrackUpdate { track }, Some(&id));
                }
            }
            Admission::Fresh | Admission::Replaced(_) => {
                info!(
                    client_id = %id,
                    title = track.title(),
                    artist = track.artist(),
                    "Station is live"
                );
                let waiting: Vec<ConnectionId> = self.station.listeners().ids().copied().collect();
                for listener in waiting {
                    self.send(&id, ServerMessage::Watcher { id: listener });
                }
                self.broadcast(ServerMessage::BroadcasterConnected { track }, Some(&id));
                let status = self.station.status();
                self.broadcast(ServerMessage::StatusUpdate(status), Some(&id));
            }
        }
        Ok(())
    }

    fn join_listener(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        let role = self.role(&id)?;
        if !role.can_become(ConnectionRole::Listener) {
            return Err(StationError::role_conflict(role, ConnectionRole::Listener).into());
        }

        let count = self.station.join_listener(id, Timestamp::now())?;
        self.registry.assign_role(&id, ConnectionRole::Listener)?;
        debug!(client_id = %id, listeners = count, "Listener joined");

        self.send(
            &id,
            ServerMessage::ListenerReady {
                is_live: self.station.is_live(),
                track: self.station.current_track().clone(),
            },
        );
        if let Some(broadcaster) = self.station.broadcaster() {
            self.send(&broadcaster, ServerMessage::Watcher { id });
        }
        self.broadcast(ServerMessage::ListenersUpdate { count }, None);
        Ok(())
    }

    fn leave_listener(&mut self, id: ConnectionId) {
        if self.station.leave_listener(&id) {
            let count = self.station.listener_count();
            debug!(client_id = %id, listeners = count, "Listener left");
            self.broadcast(ServerMessage::ListenersUpdate { count }, None);
        }
    }

    fn update_track(&mut self, id: ConnectionId, update: TrackUpdate) -> Result<(), SessionError> {
        let track = self.station.update_track(&id, &update)?.clone();
        info!(title = track.title(), artist = track.artist(), "Track updated");
        self.broadcast(ServerMessage::TrackUpdate { track }, Some(&id));
        Ok(())
    }

    fn route_signal(
        &mut self,
        router: &SignalingRouter,
        id: ConnectionId,
        signal: InboundSignal,
    ) -> Result<(), SessionError> {
        self.role(&id)?;
        let standing = SenderStanding::new(
            self.station.is_broadcaster(&id),
            self.station.listeners().contains(&id),
        );
        match router.route(
            &self.registry,
            id,
            standing,
            signal.kind,
            signal.target_id,
            signal.payload,
        ) {
            Ok(()) => Ok(()),
            Err(RouteFailure::Rejected(err)) => Err(err),
            Err(RouteFailure::Undeliverable(target)) => {
                self.pruned.push(target);
                Ok(())
            }
        }
    }

    fn relinquish(&mut self, id: ConnectionId) {
        if self.station.relinquish_broadcast(&id) {
            info!(client_id = %id, "Broadcaster went off air");
            self.announce_offline();
        }
    }

    fn announce_offline(&mut self) {
        self.broadcast(ServerMessage::BroadcasterDisconnected {}, None);
        let status = self.station.status();
        self.broadcast(ServerMessage::StatusUpdate(status), None);
    }

    /// Remove `id` and reconcile. Both role checks always run.
    fn disconnect(&mut self, id: ConnectionId) -> bool {
        if self.registry.unregister(&id).is_none() {
            return false;
        }
        if self.station.relinquish_broadcast(&id) {
            info!(client_id = %id, "Broadcaster disconnected, station offline");
            self.announce_offline();
        }
        self.leave_listener(id);
        true
    }
}
