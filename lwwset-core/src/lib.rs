//! Last-Writer-Wins Element Set
//!
//! A state-based CRDT set. Replicas apply adds and removes independently,
//! each stamped with a timestamp, and converge by merging whole states.
//! The most recent operation on an element wins; an add and a remove with
//! the same timestamp resolve to removed.
//!
//! ```
//! use lwwset_core::{LwwElementSet, Timestamp};
//!
//! let a = LwwElementSet::new();
//! let b = LwwElementSet::new();
//!
//! a.add("alice".to_string(), Timestamp(1));
//! b.remove("alice".to_string(), Timestamp(1));
//!
//! a.merge(&b);
//! assert!(!a.contains(&"alice".to_string()));
//! ```

pub mod config;
pub mod core_store;
pub mod logging;
pub mod metrics;

pub use config::{Config, ConfigError};
pub use core_store::crdt::{
    AnyClock, Clock, ClockKind, Crdt, ElementState, ElementStatus, GrowOnlyRegister, LamportClock,
    LwwElementSet, LwwOperation, LwwSnapshot, LwwState, SystemClock,
};
pub use core_store::model::Timestamp;
pub use logging::{init_logging, LogLevel};
