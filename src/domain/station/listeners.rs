//! Listener membership.

use std::collections::HashMap;

use crate::domain::foundation::{ConnectionId, Timestamp};

/// Connections currently registered as listeners, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ListenerSet {
    members: HashMap<ConnectionId, Timestamp>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or re-add a listener. Rejoining resets `joined_at`.
    ///
    /// Returns `true` if the listener was not already present.
    pub fn join(&mut self, id: ConnectionId, joined_at: Timestamp) -> bool {
        self.members.insert(id, joined_at).is_none()
    }

    /// Remove a listener. Returns `true` if it was present.
    pub fn leave(&mut self, id: &ConnectionId) -> bool {
        self.members.remove(id).is_some()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn joined_at(&self, id: &ConnectionId) -> Option<Timestamp> {
        self.members.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.members.keys()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_idempotent_for_count() {
        let mut set = ListenerSet::new();
        let id = ConnectionId::new();

        assert!(set.join(id, Timestamp::now()));
        assert!(!set.join(id, Timestamp::now()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rejoin_resets_joined_at() {
        let mut set = ListenerSet::new();
        let id = ConnectionId::new();
        let first = Timestamp::now();
        let second = first.plus_millis(5_000);

        set.join(id, first);
        set.join(id, second);
        assert_eq!(set.joined_at(&id), Some(second));
    }

    #[test]
    fn leave_unknown_is_noop() {
        let mut set = ListenerSet::new();
        assert!(!set.leave(&ConnectionId::new()));
        assert!(set.is_empty());
    }

    #[test]
    fn leave_removes_member() {
        let mut set = ListenerSet::new();
        let id = ConnectionId::new();
        set.join(id, Timestamp::now());

        assert!(set.leave(&id));
        assert!(!set.contains(&id));
    }
}
