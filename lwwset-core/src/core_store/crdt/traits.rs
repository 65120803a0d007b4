/*
    traits.rs - Core CRDT trait definitions

    Defines the unified interface that the state-based CRDTs implement:
    - Apply operations (local or replayed from another replica)
    - Merge with other replicas
    - Query current state

    Every operation is total. Conflicts are resolved by the timestamp
    policy of each type, never reported to the caller.
*/

use serde::{Deserialize, Serialize};

/// Core trait that all CRDTs must implement
pub trait Crdt: Clone + Send + Sync {
    /// The type of operations this CRDT accepts
    type Operation: Clone + Send + Sync;

    /// The type of value this CRDT represents
    type Value: Clone;

    /// Apply an operation to this CRDT.
    /// Operations carry the timestamp assigned at their originating replica.
    fn apply(&mut self, op: Self::Operation);

    /// Merge another CRDT state into this one.
    /// Must be commutative, associative and idempotent.
    fn merge(&mut self, other: &Self);

    /// Get the current value/state
    fn value(&self) -> Self::Value;
}

/// Replica-originated mutation of an LWW-Element-Set.
///
/// The timestamp is the one recorded at the originating site, so replaying
/// an operation on another replica orders it exactly as it was ordered there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LwwOperation<E, T> {
    /// Record an add of `element` at `timestamp`
    Add { element: E, timestamp: T },
    /// Record a remove of `element` at `timestamp`
    Remove { element: E, timestamp: T },
}

impl<E, T> LwwOperation<E, T> {
    pub fn add(element: E, timestamp: T) -> Self {
        LwwOperation::Add { element, timestamp }
    }

    pub fn remove(element: E, timestamp: T) -> Self {
        LwwOperation::Remove { element, timestamp }
    }

    pub fn element(&self) -> &E {
        match self {
            LwwOperation::Add { element, .. } | LwwOperation::Remove { element, .. } => element,
        }
    }

    pub fn timestamp(&self) -> &T {
        match self {
            LwwOperation::Add { timestamp, .. } | LwwOperation::Remove { timestamp, .. } => {
                timestamp
            }
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, LwwOperation::Remove { .. })
    }
}
