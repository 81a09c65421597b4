//! Notification bus - best-effort fan-out over the registry.
//!
//! Delivery failures are collected, never raised. The coordinator prunes the
//! failed connections once the fan-out is done, so a client that vanished
//! mid-broadcast cannot abort delivery to everyone else.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::ConnectionId;
use crate::domain::protocol::ServerMessage;
use crate::ports::Outbound;

use super::registry::ConnectionRegistry;

/// Result of one fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: Vec<ConnectionId>,
}

impl FanOut {
    fn record(&mut self, id: ConnectionId, ok: bool) {
        if ok {
            self.delivered += 1;
        } else {
            self.failed.push(id);
        }
    }
}

/// Stateless fan-out helpers over a registry snapshot.
pub struct NotificationBus;

impl NotificationBus {
    /// Deliver `message` to every registered connection except `except`.
    pub fn broadcast(
        registry: &ConnectionRegistry,
        message: &ServerMessage,
        except: Option<&ConnectionId>,
    ) -> FanOut {
        let mut fan_out = FanOut::default();
        for conn in registry.iter() {
            if except == Some(&conn.id()) {
                continue;
            }
            let ok = Self::deliver(registry, &conn.id(), Outbound::Message(message.clone()));
            fan_out.record(conn.id(), ok);
        }
        fan_out
    }

    /// Deliver `message` to one connection.
    ///
    /// Returns `false` if the connection is absent or its sink failed.
    pub fn send_to(registry: &ConnectionRegistry, id: &ConnectionId, message: ServerMessage) -> bool {
        Self::deliver(registry, id, Outbound::Message(message))
    }

    /// Forward a binary frame verbatim to each of `targets`.
    pub fn relay_audio<'a>(
        registry: &ConnectionRegistry,
        targets: impl IntoIterator<Item = &'a ConnectionId>,
        frame: Arc<[u8]>,
    ) -> FanOut {
        let mut fan_out = FanOut::default();
        for id in targets {
            let ok = Self::deliver(registry, id, Outbound::Audio(frame.clone()));
            fan_out.record(*id, ok);
        }
        fan_out
    }

    fn deliver(registry: &ConnectionRegistry, id: &ConnectionId, outbound: Outbound) -> bool {
        let Some(conn) = registry.get(id) else {
            return false;
        };
        match conn.sink().deliver(outbound) {
            Ok(()) => true,
            Err(e) => {
                debug!(client_id = %id, error = %e, "Delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingSink;
    use crate::domain::foundation::Timestamp;

    fn setup(n: usize) -> (ConnectionRegistry, Vec<(ConnectionId, Arc<RecordingSink>)>) {
        let mut registry = ConnectionRegistry::new();
        let clients = (0..n)
            .map(|_| {
                let id = ConnectionId::new();
                let sink = RecordingSink::shared();
                registry.register(id, sink.clone(), Timestamp::now());
                (id, sink)
            })
            .collect();
        (registry, clients)
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let (registry, clients) = setup(3);

        let fan_out = NotificationBus::broadcast(
            &registry,
            &ServerMessage::ListenersUpdate { count: 3 },
            None,
        );

        assert_eq!(fan_out.delivered, 3);
        assert!(fan_out.failed.is_empty());
        for (_, sink) in &clients {
            assert_eq!(sink.kinds(), vec!["listeners-update"]);
        }
    }

    #[test]
    fn broadcast_skips_excluded_connection() {
        let (registry, clients) = setup(2);
        let (author, author_sink) = &clients[0];

        NotificationBus::broadcast(&registry, &ServerMessage::pong(), Some(author));

        assert!(author_sink.kinds().is_empty());
        assert_eq!(clients[1].1.kinds(), vec!["pong"]);
    }

    #[test]
    fn broadcast_collects_failures_and_continues() {
        let (registry, clients) = setup(3);
        clients[1].1.close();

        let fan_out = NotificationBus::broadcast(&registry, &ServerMessage::pong(), None);

        assert_eq!(fan_out.delivered, 2);
        assert_eq!(fan_out.failed, vec![clients[1].0]);
        assert_eq!(clients[2].1.kinds(), vec!["pong"]);
    }

    #[test]
    fn send_to_unknown_connection_fails_quietly() {
        let (registry, _) = setup(1);
        assert!(!NotificationBus::send_to(&registry, &ConnectionId::new(), ServerMessage::pong()));
    }

    #[test]
    fn relay_audio_reaches_only_targets() {
        let (registry, clients) = setup(3);

        let fan_out =
            NotificationBus::relay_audio(&registry, [&clients[1].0], Arc::from(vec![9u8; 4]));

        assert_eq!(fan_out.delivered, 1);
        assert_eq!(clients[1].1.audio().len(), 1);
        assert!(clients[0].1.audio().is_empty());
        assert!(clients[2].1.audio().is_empty());
    }
}
