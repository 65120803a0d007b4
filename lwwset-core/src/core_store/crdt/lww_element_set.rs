/*
    lww_element_set.rs - Thread-safe LWW-Element-Set

    Wraps `LwwState` (the add-set and remove-set) in a single RwLock:
    - add / remove / apply / merge take the write lock
    - lookup / equal / elements / snapshot / to_map take the read lock

    Reads hand back owned copies, never references into the registers.

    Merging or comparing two sets locks both; the locks are always taken
    in address order so `a.merge(&b)` and `b.merge(&a)` running at the
    same time cannot deadlock.
*/

use super::clock::Clock;
use super::lww_set::{ElementState, ElementStatus, LwwSnapshot, LwwState};
use super::g_register::GrowOnlyRegister;
use super::traits::{Crdt, LwwOperation};
use crate::core_store::model::Timestamp;
use crate::metrics::{self, Timer};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ptr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// LWW-Element-Set safe for concurrent callers.
///
/// `equal` compares full register contents, not just visible members:
/// two sets can list the same elements and still be unequal when their
/// tombstones or timestamps differ.
///
/// Timestamps are supplied by the caller so replica-originated operations
/// keep the order they had at their origin. Ties between an add and a
/// remove resolve to removed.
pub struct LwwElementSet<E: Eq + Hash, T = Timestamp> {
    state: RwLock<LwwState<E, T>>,
}

impl<E, T> LwwElementSet<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    /// Create a new empty set
    pub fn new() -> Self {
        Self::from_state(LwwState::new())
    }

    pub fn from_state(state: LwwState<E, T>) -> Self {
        LwwElementSet { state: RwLock::new(state) }
    }

    /// Rehydrate from a register pair
    pub fn from_registers(adds: GrowOnlyRegister<E, T>, removes: GrowOnlyRegister<E, T>) -> Self {
        Self::from_state(LwwState::from_registers(adds, removes))
    }

    /// Rehydrate from a previously exported snapshot
    pub fn from_snapshot(snapshot: LwwSnapshot<E, T>) -> Self {
        debug!(
            adds = snapshot.adds.len(),
            removes = snapshot.removes.len(),
            "rehydrating lww set from snapshot"
        );
        Self::from_state(LwwState::from_snapshot(snapshot))
    }

    // A panic while holding the lock cannot leave the registers half
    // updated (every mutation is one map insert), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, LwwState<E, T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LwwState<E, T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an add of `element` at `timestamp`
    pub fn add(&self, element: E, timestamp: T) {
        let changed = self.write().add(element, timestamp);
        metrics::record_counter(metrics::LWW_SET_ADD, 1);
        trace!(changed, "lww add");
    }

    /// Record a remove of `element` at `timestamp`
    pub fn remove(&self, element: E, timestamp: T) {
        let changed = self.write().remove(element, timestamp);
        metrics::record_counter(metrics::LWW_SET_REMOVE, 1);
        trace!(changed, "lww remove");
    }

    /// Add stamped with `clock`; returns the timestamp used.
    ///
    /// Only meaningful for single-process use or replicas sharing one
    /// clock domain. Replicated operations should go through `add`
    /// with the originating timestamp.
    pub fn add_now<C: Clock<T> + ?Sized>(&self, element: E, clock: &C) -> T {
        let mut state = self.write();
        // stamp under the lock so stamps follow lock order
        let timestamp = clock.now();
        state.add(element, timestamp.clone());
        drop(state);

        metrics::record_counter(metrics::LWW_SET_ADD, 1);
        timestamp
    }

    /// Remove stamped with `clock`; returns the timestamp used.
    /// Same caveats as [`add_now`](Self::add_now).
    pub fn remove_now<C: Clock<T> + ?Sized>(&self, element: E, clock: &C) -> T {
        let mut state = self.write();
        let timestamp = clock.now();
        state.remove(element, timestamp.clone());
        drop(state);

        metrics::record_counter(metrics::LWW_SET_REMOVE, 1);
        timestamp
    }

    /// Replay an operation received from another replica
    pub fn apply(&self, op: LwwOperation<E, T>)
    where
        E: Send + Sync,
        T: Send + Sync,
    {
        let name = if op.is_remove() { metrics::LWW_SET_REMOVE } else { metrics::LWW_SET_ADD };
        self.write().apply(op);
        metrics::record_counter(name, 1);
    }

    /// Membership check returning the winning add timestamp.
    /// Non-members yield `(T::default(), false)`.
    pub fn lookup(&self, element: &E) -> (T, bool) {
        self.read().lookup(element)
    }

    pub fn contains(&self, element: &E) -> bool {
        self.read().contains(element)
    }

    pub fn status(&self, element: &E) -> ElementStatus {
        self.read().status(element)
    }

    /// Merge another set's state into this one.
    ///
    /// `other` is only read-locked. Merging a set with itself is a no-op.
    pub fn merge(&self, other: &LwwElementSet<E, T>) {
        if ptr::eq(self, other) {
            trace!("skipping merge of lww set with itself");
            return;
        }

        let timer = Timer::new(metrics::LWW_SET_MERGE_DURATION);
        let (changed, size) = if self.locks_before(other) {
            let mut ours = self.write();
            let theirs = other.read();
            (ours.merge(&theirs), ours.len())
        } else {
            let theirs = other.read();
            let mut ours = self.write();
            (ours.merge(&theirs), ours.len())
        };
        timer.stop();

        metrics::record_counter(metrics::LWW_SET_MERGE, 1);
        metrics::record_counter(metrics::LWW_SET_MERGE_CHANGED, changed as u64);
        metrics::record_gauge(metrics::LWW_SET_SIZE, size as f64);
        debug!(changed, size, "merged lww set");
    }

    /// Merge a detached state (e.g. one just decoded off the wire)
    pub fn merge_state(&self, other: &LwwState<E, T>) {
        let changed = self.write().merge(other);
        metrics::record_counter(metrics::LWW_SET_MERGE, 1);
        metrics::record_counter(metrics::LWW_SET_MERGE_CHANGED, changed as u64);
        debug!(changed, "merged detached lww state");
    }

    /// Register-level equality, see the type docs
    pub fn equal(&self, other: &LwwElementSet<E, T>) -> bool {
        if ptr::eq(self, other) {
            return true;
        }

        let (first, second) = if self.locks_before(other) { (self, other) } else { (other, self) };
        let first = first.read();
        let second = second.read();
        first.equal(&second)
    }

    /// Visible members, as an owned list in no particular order
    pub fn elements(&self) -> Vec<E> {
        self.read().elements()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Owned export of both registers
    pub fn snapshot(&self) -> LwwSnapshot<E, T> {
        self.read().snapshot()
    }

    /// Owned single-map view, see [`LwwState::to_map`]
    pub fn to_map(&self) -> HashMap<E, ElementState<T>> {
        self.read().to_map()
    }

    /// Owned copy of the full state
    pub fn state(&self) -> LwwState<E, T> {
        self.read().clone()
    }

    pub fn into_state(self) -> LwwState<E, T> {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn locks_before(&self, other: &LwwElementSet<E, T>) -> bool {
        (self as *const Self as usize) < (other as *const Self as usize)
    }
}

impl<E, T> Default for LwwElementSet<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Independent copy: later changes to either set are not seen by the other
impl<E, T> Clone for LwwElementSet<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn clone(&self) -> Self {
        Self::from_state(self.state())
    }
}

impl<E, T> From<LwwState<E, T>> for LwwElementSet<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn from(state: LwwState<E, T>) -> Self {
        Self::from_state(state)
    }
}

impl<E, T> From<LwwSnapshot<E, T>> for LwwElementSet<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn from(snapshot: LwwSnapshot<E, T>) -> Self {
        Self::from_snapshot(snapshot)
    }
}

impl<E, T> fmt::Debug for LwwElementSet<E, T>
where
    E: Eq + Hash + Clone + fmt::Debug,
    T: Ord + Clone + Default + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwwElementSet").field("state", &*self.read()).finish()
    }
}
