//! Station invariants under arbitrary operation sequences and concurrent access.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use station_relay::adapters::memory::RecordingSink;
use station_relay::application::{CoordinatorSettings, SessionCoordinator, SessionError};
use station_relay::domain::foundation::ConnectionId;
use station_relay::domain::protocol::ClientMessage;
use station_relay::domain::station::{StationError, Track};

const SLOTS: usize = 5;

fn settings() -> CoordinatorSettings {
    CoordinatorSettings::new(Track::new("Idle", "Station", None).unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Unassigned,
    Broadcaster,
    Listener,
}

#[derive(Debug, Clone)]
enum Op {
    Connect(usize),
    GoLive(usize),
    Listen(usize),
    Leave(usize),
    Relinquish(usize),
    Disconnect(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let slot = 0..SLOTS;
    prop_oneof![
        slot.clone().prop_map(Op::Connect),
        slot.clone().prop_map(Op::GoLive),
        slot.clone().prop_map(Op::Listen),
        slot.clone().prop_map(Op::Leave),
        slot.clone().prop_map(Op::Relinquish),
        slot.prop_map(Op::Disconnect),
    ]
}

#[derive(Default)]
struct Model {
    roles: HashMap<usize, Role>,
    broadcaster: Option<usize>,
    listeners: HashSet<usize>,
    peak: usize,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Connect(i) => {
                self.roles.entry(i).or_insert(Role::Unassigned);
            }
            Op::GoLive(i) => {
                let Some(role) = self.roles.get(&i).copied() else { return };
                if role == Role::Listener {
                    return;
                }
                if self.broadcaster.is_none() || self.broadcaster == Some(i) {
                    self.broadcaster = Some(i);
                    self.roles.insert(i, Role::Broadcaster);
                }
            }
            Op::Listen(i) => {
                let Some(role) = self.roles.get(&i).copied() else { return };
                if role == Role::Broadcaster {
                    return;
                }
                self.listeners.insert(i);
                self.roles.insert(i, Role::Listener);
                self.peak = self.peak.max(self.listeners.len());
            }
            Op::Leave(i) => {
                self.listeners.remove(&i);
            }
            Op::Relinquish(i) => {
                if self.broadcaster == Some(i) {
                    self.broadcaster = None;
                }
            }
            Op::Disconnect(i) => {
                if self.roles.remove(&i).is_some() {
                    if self.broadcaster == Some(i) {
                        self.broadcaster = None;
                    }
                    self.listeners.remove(&i);
                }
            }
        }
    }
}

async fn run_ops(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let coordinator = SessionCoordinator::new(settings());
    let mut ids: HashMap<usize, ConnectionId> = HashMap::new();
    let mut model = Model::default();
    let mut last_peak = 0;

    for op in &ops {
        match *op {
            Op::Connect(i) => {
                if !ids.contains_key(&i) {
                    let id = coordinator.connect(RecordingSink::shared()).await;
                    ids.insert(i, id);
                }
            }
            Op::GoLive(i) => {
                if let Some(id) = ids.get(&i) {
                    let _ = coordinator
                        .handle(*id, ClientMessage::BroadcasterConnect { track: None })
                        .await;
                }
            }
            Op::Listen(i) => {
                if let Some(id) = ids.get(&i) {
                    let _ = coordinator.handle(*id, ClientMessage::ListenerConnect).await;
                }
            }
            Op::Leave(i) => {
                if let Some(id) = ids.get(&i) {
                    let _ = coordinator.handle(*id, ClientMessage::ListenerDisconnect).await;
                }
            }
            Op::Relinquish(i) => {
                if let Some(id) = ids.get(&i) {
                    let _ = coordinator
                        .handle(*id, ClientMessage::BroadcasterDisconnect)
                        .await;
                }
            }
            Op::Disconnect(i) => {
                if let Some(id) = ids.remove(&i) {
                    prop_assert!(coordinator.disconnect(id).await);
                }
            }
        }
        model.apply(op);

        let snapshot = coordinator.snapshot().await;
        prop_assert_eq!(snapshot.is_live, model.broadcaster.is_some());
        prop_assert_eq!(snapshot.listener_count, model.listeners.len());
        prop_assert_eq!(snapshot.stats.peak_listeners, model.peak);
        prop_assert!(snapshot.stats.peak_listeners >= last_peak);
        prop_assert!(snapshot.stats.peak_listeners >= snapshot.listener_count);
        prop_assert_eq!(coordinator.connection_count().await, ids.len());
        last_peak = snapshot.stats.peak_listeners;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn station_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run_ops(ops))?;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_admission_admits_exactly_one() {
    let coordinator = Arc::new(SessionCoordinator::new(settings()));
    let mut ids = Vec::new();
    for _ in 0..32 {
        ids.push(coordinator.connect(RecordingSink::shared()).await);
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let coordinator = coordinator.clone();
            let id = *id;
            tokio::spawn(async move {
                coordinator
                    .handle(id, ClientMessage::BroadcasterConnect { track: None })
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => admitted += 1,
            Err(err) => assert_eq!(err, SessionError::Station(StationError::AlreadyBroadcasting)),
        }
    }

    assert_eq!(admitted, 1);
    assert!(coordinator.status().await.is_live);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_and_disconnects_keep_count_consistent() {
    let coordinator = Arc::new(SessionCoordinator::new(settings()));
    let mut ids = Vec::new();
    for _ in 0..64 {
        ids.push(coordinator.connect(RecordingSink::shared()).await);
    }

    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(n, id)| {
            let coordinator = coordinator.clone();
            let id = *id;
            tokio::spawn(async move {
                coordinator
                    .handle(id, ClientMessage::ListenerConnect)
                    .await
                    .unwrap();
                if n % 2 == 0 {
                    coordinator.disconnect(id).await;
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.listener_count, 32);
    assert_eq!(coordinator.connection_count().await, 32);
    assert!(snapshot.stats.peak_listeners >= 32);
    assert!(snapshot.stats.peak_listeners <= 64);
}
