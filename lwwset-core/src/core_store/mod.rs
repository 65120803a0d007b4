/*
    core_store - Replicated set state

    Handles:
    - Timestamp model
    - CRDT state, merge and conflict resolution
    - Locking discipline for concurrent local callers

    Transport, persistence and tombstone collection live outside this layer;
    they exchange `LwwSnapshot` values with it.
*/

pub mod crdt;
pub mod model;

#[cfg(test)]
pub mod tests;

// Re-export commonly used types
pub use crdt::{Crdt, GrowOnlyRegister, LwwElementSet, LwwOperation, LwwSnapshot, LwwState};
pub use model::Timestamp;
