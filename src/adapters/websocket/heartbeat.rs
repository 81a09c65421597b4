//! Heartbeat ping/pong liveness monitoring.
//!
//! The writer task pings on every interval tick; the reader task marks the
//! connection alive whenever the peer sends anything (pongs included). A
//! connection that misses `timeout / interval` consecutive ticks is dead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ping cadence and how long a silent peer is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl HeartbeatSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Consecutive silent ticks before the peer is declared dead.
    ///
    /// Computed as `timeout / interval`, clamped to at least 1.
    pub fn max_missed(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        let missed = (self.timeout.as_millis() / interval).max(1);
        u32::try_from(missed).unwrap_or(u32::MAX)
    }
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(25), Duration::from_secs(60))
    }
}

/// Shared alive flag between a connection's reader and writer.
#[derive(Debug)]
pub struct Liveness {
    alive: AtomicBool,
}

impl Liveness {
    /// A fresh connection counts as alive.
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
        }
    }

    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Whether the peer spoke since the last check. Resets the flag.
    pub fn check_alive(&self) -> bool {
        self.alive.swap(false, Ordering::Relaxed)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// What the writer should do on a heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// Send another ping.
    Ping,
    /// Too many silent ticks; close the connection.
    TimedOut,
}

/// Counts consecutive silent ticks for one connection.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    liveness: Arc<Liveness>,
    missed: u32,
    max_missed: u32,
}

impl HeartbeatMonitor {
    pub fn new(liveness: Arc<Liveness>, settings: &HeartbeatSettings) -> Self {
        Self {
            liveness,
            missed: 0,
            max_missed: settings.max_missed(),
        }
    }

    pub fn tick(&mut self) -> Beat {
        if self.liveness.check_alive() {
            self.missed = 0;
            return Beat::Ping;
        }
        self.missed += 1;
        if self.missed >= self.max_missed {
            Beat::TimedOut
        } else {
            Beat::Ping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(interval_ms: u64, timeout_ms: u64) -> HeartbeatSettings {
        HeartbeatSettings::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    #[test]
    fn max_missed_is_timeout_over_interval() {
        assert_eq!(settings(100, 300).max_missed(), 3);
        assert_eq!(HeartbeatSettings::default().max_missed(), 2);
    }

    #[test]
    fn max_missed_is_at_least_one() {
        assert_eq!(settings(100, 50).max_missed(), 1);
        assert_eq!(settings(0, 0).max_missed(), 1);
    }

    #[test]
    fn check_alive_resets_flag() {
        let liveness = Liveness::new();
        assert!(liveness.check_alive());
        assert!(!liveness.check_alive());

        liveness.mark_alive();
        assert!(liveness.check_alive());
    }

    #[test]
    fn silent_peer_times_out_after_max_missed() {
        let liveness = Arc::new(Liveness::new());
        let mut monitor = HeartbeatMonitor::new(liveness, &settings(100, 300));

        // First tick consumes the initial alive flag.
        assert_eq!(monitor.tick(), Beat::Ping);
        assert_eq!(monitor.tick(), Beat::Ping);
        assert_eq!(monitor.tick(), Beat::Ping);
        assert_eq!(monitor.tick(), Beat::TimedOut);
    }

    #[test]
    fn any_activity_resets_the_miss_count() {
        let liveness = Arc::new(Liveness::new());
        let mut monitor = HeartbeatMonitor::new(liveness.clone(), &settings(100, 200));

        for _ in 0..10 {
            assert_eq!(monitor.tick(), Beat::Ping);
            liveness.mark_alive();
        }
        assert_eq!(monitor.tick(), Beat::Ping);
        assert_eq!(monitor.tick(), Beat::Ping);
        assert_eq!(monitor.tick(), Beat::TimedOut);
    }
}
