/*
    clock.rs - Timestamp sources for locally stamped operations

    The set itself only ever compares caller-supplied timestamps. A clock is
    needed only by the `add_now` / `remove_now` conveniences, which stamp an
    operation at the moment it is issued. That is fine inside one process but
    gives no cross-replica ordering guarantee beyond what the clocks of the
    replicas share.
*/

use crate::core_store::model::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of timestamps for locally issued operations
pub trait Clock<T>: Send + Sync {
    /// Next timestamp. Successive calls on one clock never go backwards.
    fn now(&self) -> T;
}

/// Wall-clock nanoseconds, forced strictly increasing within the process.
///
/// Two calls landing on the same nanosecond (or a wall clock stepping
/// backwards) would otherwise hand out equal or decreasing timestamps.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { last: AtomicU64::new(0) }
    }
}

impl Clock<Timestamp> for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Timestamp::now().as_nanos();
        let mut issued = wall;
        // fetch_update only fails when the closure returns None
        let _ = self.last.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            issued = wall.max(last.saturating_add(1));
            Some(issued)
        });
        Timestamp(issued)
    }
}

/// Lamport counter.
///
/// Replicas that fold every received timestamp in with [`observe`](Self::observe)
/// stamp their next operation after anything they have seen.
#[derive(Debug, Default)]
pub struct LamportClock {
    counter: AtomicU64,
}

impl LamportClock {
    pub fn new() -> Self {
        LamportClock { counter: AtomicU64::new(0) }
    }

    /// Start counting after `start`
    pub fn starting_at(start: u64) -> Self {
        LamportClock { counter: AtomicU64::new(start) }
    }

    /// Fold in a timestamp received from another replica
    pub fn observe(&self, remote: Timestamp) {
        self.counter.fetch_max(remote.as_nanos(), Ordering::AcqRel);
    }

    /// Last timestamp issued or observed
    pub fn current(&self) -> Timestamp {
        Timestamp(self.counter.load(Ordering::Acquire))
    }
}

impl Clock<Timestamp> for LamportClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.counter.fetch_add(1, Ordering::AcqRel).saturating_add(1))
    }
}

/// Which clock to build from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    #[default]
    System,
    Lamport,
}

impl ClockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockKind::System => "system",
            ClockKind::Lamport => "lamport",
        }
    }

    /// Parse a clock name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" | "wall" => Some(ClockKind::System),
            "lamport" | "logical" => Some(ClockKind::Lamport),
            _ => None,
        }
    }

    pub fn build(&self) -> AnyClock {
        match self {
            ClockKind::System => AnyClock::System(SystemClock::new()),
            ClockKind::Lamport => AnyClock::Lamport(LamportClock::new()),
        }
    }
}

/// A clock chosen at runtime
#[derive(Debug)]
pub enum AnyClock {
    System(SystemClock),
    Lamport(LamportClock),
}

impl AnyClock {
    pub fn kind(&self) -> ClockKind {
        match self {
            AnyClock::System(_) => ClockKind::System,
            AnyClock::Lamport(_) => ClockKind::Lamport,
        }
    }
}

impl Clock<Timestamp> for AnyClock {
    fn now(&self) -> Timestamp {
        match self {
            AnyClock::System(clock) => clock.now(),
            AnyClock::Lamport(clock) => clock.now(),
        }
    }
}
