//! Connection registry.
//!
//! Tracks every live connection, its role, and the sink used to reach it.
//! Owned by the session coordinator and only touched under its lock.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::station::{ConnectionRole, StationError};
use crate::ports::ConnectionSink;

/// A registered client connection.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    role: ConnectionRole,
    connected_at: Timestamp,
    sink: Arc<dyn ConnectionSink>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub fn sink(&self) -> &Arc<dyn ConnectionSink> {
        &self.sink
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// All live connections keyed by id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection with no role yet.
    pub fn register(&mut self, id: ConnectionId, sink: Arc<dyn ConnectionSink>, now: Timestamp) {
        self.connections.insert(
            id,
            Connection {
                id,
                role: ConnectionRole::Unassigned,
                connected_at: now,
                sink,
            },
        );
    }

    /// Remove a connection. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn exists(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn role(&self, id: &ConnectionId) -> Option<ConnectionRole> {
        self.connections.get(id).map(Connection::role)
    }

    /// Give a connection its role.
    ///
    /// # Errors
    ///
    /// - `RoleConflict` if the connection already holds a different role
    ///
    /// Returns `Ok(false)` for unknown ids.
    pub fn assign_role(
        &mut self,
        id: &ConnectionId,
        role: ConnectionRole,
    ) -> Result<bool, StationError> {
        let Some(conn) = self.connections.get_mut(id) else {
            return Ok(false);
        };
        if !conn.role.can_become(role) {
            return Err(StationError::role_conflict(conn.role, role));
        }
        conn.role = role;
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Drop every connection, closing their sinks.
    pub fn clear(&mut self) -> usize {
        let count = self.connections.len();
        self.connections.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingSink;

    fn registry_with(id: ConnectionId) -> ConnectionRegistry {
        let mut registry = ConnectionRegistry::new();
        registry.register(id, RecordingSink::shared(), Timestamp::now());
        registry
    }

    #[test]
    fn register_starts_unassigned() {
        let id = ConnectionId::new();
        let registry = registry_with(id);

        assert!(registry.exists(&id));
        assert_eq!(registry.role(&id), Some(ConnectionRole::Unassigned));
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let mut registry = registry_with(ConnectionId::new());
        assert!(registry.unregister(&ConnectionId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_twice_returns_connection_once() {
        let id = ConnectionId::new();
        let mut registry = registry_with(id);

        assert!(registry.unregister(&id).is_some());
        assert!(registry.unregister(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn role_is_assigned_once() {
        let id = ConnectionId::new();
        let mut registry = registry_with(id);

        assert_eq!(registry.assign_role(&id, ConnectionRole::Listener), Ok(true));
        assert_eq!(registry.assign_role(&id, ConnectionRole::Listener), Ok(true));
        assert_eq!(
            registry.assign_role(&id, ConnectionRole::Broadcaster),
            Err(StationError::role_conflict(
                ConnectionRole::Listener,
                ConnectionRole::Broadcaster
            ))
        );
        assert_eq!(registry.role(&id), Some(ConnectionRole::Listener));
    }

    #[test]
    fn assign_role_to_unknown_is_noop() {
        let mut registry = ConnectionRegistry::new();
        assert_eq!(
            registry.assign_role(&ConnectionId::new(), ConnectionRole::Broadcaster),
            Ok(false)
        );
    }

    #[test]
    fn clear_drops_everything() {
        let mut registry = registry_with(ConnectionId::new());
        registry.register(ConnectionId::new(), RecordingSink::shared(), Timestamp::now());

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
    }
}
