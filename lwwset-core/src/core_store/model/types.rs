/*
    types.rs - Core value types for the replicated set

    Contains:
    - Timestamp (the default ordering tag for add/remove records)
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Ordering tag attached to every add and remove record.
///
/// The zero value is the "no timestamp" sentinel returned by lookups that
/// find nothing, so `Default` is `Timestamp(0)` rather than the current time.
/// Wall-clock nanoseconds and logical counters both fit in the same `u64`
/// domain; replicas must agree on which one they use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The sentinel for "never recorded"
    pub const ZERO: Timestamp = Timestamp(0);

    /// Wall-clock nanoseconds since the UNIX epoch.
    ///
    /// A clock set before the epoch yields the sentinel.
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Timestamp(nanos)
    }

    pub fn from_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// True for the "never recorded" sentinel
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Timestamp(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
