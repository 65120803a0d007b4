/*
    lww_set.rs - Last-Writer-Wins Element Set CRDT (unsynchronized state)

    Two grow-only registers: `adds` and `removes`, each holding the latest
    timestamp seen for that kind of operation. Membership is derived at
    query time:

        member(e)  <=>  e in adds  &&  (e not in removes || adds[e] > removes[e])

    Ties go to the remove (removal bias). Merge is the independent merge
    of both registers, so it inherits commutativity, associativity and
    idempotence from them.

    Use cases:
    - Replicated membership lists
    - Tag sets
    - Presence tracking

    For shared use across threads see `LwwElementSet`.
*/

use super::g_register::GrowOnlyRegister;
use super::traits::{Crdt, LwwOperation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

/// Logical state of a single element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementStatus {
    /// Never added nor removed on any replica seen so far
    Absent,
    /// Latest add is strictly newer than any remove
    Added,
    /// A remove at or after the latest add (or a remove with no add)
    Removed,
}

/// Unified view of one element: removal flag plus the timestamp of the
/// operation that decided it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState<T> {
    pub is_removed: bool,
    pub updated_at: T,
}

/// Exported register pair, the unit exchanged with storage and transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LwwSnapshot<E: Eq + Hash, T> {
    pub adds: HashMap<E, T>,
    pub removes: HashMap<E, T>,
}

impl<E: Eq + Hash, T> Default for LwwSnapshot<E, T> {
    fn default() -> Self {
        LwwSnapshot { adds: HashMap::new(), removes: HashMap::new() }
    }
}

/// LWW-Element-Set state without any locking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LwwState<E: Eq + Hash, T> {
    adds: GrowOnlyRegister<E, T>,
    removes: GrowOnlyRegister<E, T>,
}

impl<E, T> LwwState<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    /// Create a new empty set state
    pub fn new() -> Self {
        LwwState { adds: GrowOnlyRegister::new(), removes: GrowOnlyRegister::new() }
    }

    /// Build from an existing register pair
    pub fn from_registers(adds: GrowOnlyRegister<E, T>, removes: GrowOnlyRegister<E, T>) -> Self {
        LwwState { adds, removes }
    }

    pub fn from_snapshot(snapshot: LwwSnapshot<E, T>) -> Self {
        LwwState {
            adds: GrowOnlyRegister::from_map(snapshot.adds),
            removes: GrowOnlyRegister::from_map(snapshot.removes),
        }
    }

    /// Record an add of `element` at `timestamp`.
    /// Returns whether the add-set changed.
    pub fn add(&mut self, element: E, timestamp: T) -> bool {
        self.adds.record(element, timestamp)
    }

    /// Record a remove of `element` at `timestamp`.
    /// Returns whether the remove-set changed.
    pub fn remove(&mut self, element: E, timestamp: T) -> bool {
        self.removes.record(element, timestamp)
    }

    /// Membership check returning the winning add timestamp.
    ///
    /// Non-members yield `(T::default(), false)`.
    pub fn lookup(&self, element: &E) -> (T, bool) {
        let Some(added_at) = self.adds.get(element) else {
            return (T::default(), false);
        };

        match self.removes.get(element) {
            // remove at or after the add wins
            Some(removed_at) if removed_at >= added_at => (T::default(), false),
            _ => (added_at.clone(), true),
        }
    }

    pub fn contains(&self, element: &E) -> bool {
        self.lookup(element).1
    }

    pub fn status(&self, element: &E) -> ElementStatus {
        if self.contains(element) {
            ElementStatus::Added
        } else if self.adds.contains(element) || self.removes.contains(element) {
            ElementStatus::Removed
        } else {
            ElementStatus::Absent
        }
    }

    /// Merge another replica's state into this one.
    /// Returns the number of register entries that changed.
    pub fn merge(&mut self, other: &LwwState<E, T>) -> usize {
        let added = self.adds.merge(&other.adds);
        let removed = self.removes.merge(&other.removes);
        trace!(added, removed, "merged lww state");
        added + removed
    }

    /// Register-level equality.
    ///
    /// Stricter than equal membership: two states exposing the same members
    /// but holding different tombstones or timestamps are NOT equal.
    pub fn equal(&self, other: &LwwState<E, T>) -> bool {
        self.adds.equal(&other.adds) && self.removes.equal(&other.removes)
    }

    /// Currently visible members, in no particular order
    pub fn elements(&self) -> Vec<E> {
        self.adds
            .iter()
            .filter(|(element, _)| self.contains(element))
            .map(|(element, _)| element.clone())
            .collect()
    }

    /// Number of visible members
    pub fn len(&self) -> usize {
        self.adds.iter().filter(|(element, _)| self.contains(element)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn adds(&self) -> &GrowOnlyRegister<E, T> {
        &self.adds
    }

    pub fn removes(&self) -> &GrowOnlyRegister<E, T> {
        &self.removes
    }

    /// Owned export of both registers
    pub fn snapshot(&self) -> LwwSnapshot<E, T> {
        LwwSnapshot { adds: self.adds.to_map(), removes: self.removes.to_map() }
    }

    pub fn into_snapshot(self) -> LwwSnapshot<E, T> {
        LwwSnapshot { adds: self.adds.into_map(), removes: self.removes.into_map() }
    }

    /// Single-map view of every element ever seen.
    ///
    /// `updated_at` is the latest timestamp from either register and
    /// `is_removed` follows the same removal-biased rule as `lookup`.
    pub fn to_map(&self) -> HashMap<E, ElementState<T>> {
        let mut view = HashMap::with_capacity(self.adds.len().max(self.removes.len()));

        for (element, added_at) in self.adds.iter() {
            view.insert(
                element.clone(),
                ElementState { is_removed: false, updated_at: added_at.clone() },
            );
        }

        for (element, removed_at) in self.removes.iter() {
            match view.get_mut(element) {
                Some(state) if *removed_at >= state.updated_at => {
                    state.is_removed = true;
                    state.updated_at = removed_at.clone();
                }
                Some(_) => {}
                None => {
                    view.insert(
                        element.clone(),
                        ElementState { is_removed: true, updated_at: removed_at.clone() },
                    );
                }
            }
        }

        view
    }
}

impl<E, T> Crdt for LwwState<E, T>
where
    E: Eq + Hash + Clone + Send + Sync,
    T: Ord + Clone + Default + Send + Sync,
{
    type Operation = LwwOperation<E, T>;
    type Value = Vec<E>;

    fn apply(&mut self, op: Self::Operation) {
        match op {
            LwwOperation::Add { element, timestamp } => {
                self.add(element, timestamp);
            }
            LwwOperation::Remove { element, timestamp } => {
                self.remove(element, timestamp);
            }
        }
    }

    fn merge(&mut self, other: &Self) {
        LwwState::merge(self, other);
    }

    fn value(&self) -> Self::Value {
        self.elements()
    }
}

impl<E, T> PartialEq for LwwState<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<E, T> Eq for LwwState<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
}

impl<E, T> Default for LwwState<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> From<LwwSnapshot<E, T>> for LwwState<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn from(snapshot: LwwSnapshot<E, T>) -> Self {
        LwwState::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_store::model::Timestamp;

    fn ts(n: u64) -> Timestamp {
        Timestamp(n)
    }

    #[test]
    fn test_lww_state_creation() {
        let state: LwwState<String, Timestamp> = LwwState::new();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
        assert!(state.elements().is_empty());
    }

    #[test]
    fn test_add_then_lookup() {
        let mut state = LwwState::new();
        state.add('x', ts(1));
        assert_eq!(state.lookup(&'x'), (ts(1), true));
    }

    #[test]
    fn test_later_remove_wins() {
        let mut state = LwwState::new();
        state.add('x', ts(1));
        state.remove('x', ts(2));
        assert_eq!(state.lookup(&'x'), (Timestamp::ZERO, false));
    }

    #[test]
    fn test_earlier_remove_loses() {
        let mut state = LwwState::new();
        state.add('x', ts(2));
        state.remove('x', ts(1));
        assert_eq!(state.lookup(&'x'), (ts(2), true));
    }

    #[test]
    fn test_tie_resolves_to_removed() {
        let mut state = LwwState::new();
        state.add('x', ts(5));
        state.remove('x', ts(5));
        assert!(!state.contains(&'x'));
        assert_eq!(state.status(&'x'), ElementStatus::Removed);
    }

    #[test]
    fn test_remove_without_add_is_not_member() {
        let mut state = LwwState::new();
        state.remove('x', ts(5));
        assert_eq!(state.lookup(&'x'), (Timestamp::ZERO, false));
        assert_eq!(state.status(&'x'), ElementStatus::Removed);

        // a later add still wins over the earlier tombstone
        state.add('x', ts(6));
        assert_eq!(state.lookup(&'x'), (ts(6), true));
    }

    #[test]
    fn test_readd_after_remove() {
        let mut state = LwwState::new();
        state.add('a', ts(1));
        state.remove('a', ts(2));
        assert!(!state.contains(&'a'));

        state.add('a', ts(3));
        assert!(state.contains(&'a'));
    }

    #[test]
    fn test_status_transitions() {
        let mut state = LwwState::new();
        assert_eq!(state.status(&'a'), ElementStatus::Absent);
        state.add('a', ts(1));
        assert_eq!(state.status(&'a'), ElementStatus::Added);
        state.remove('a', ts(2));
        assert_eq!(state.status(&'a'), ElementStatus::Removed);
    }

    #[test]
    fn test_elements_lists_only_members() {
        let mut state = LwwState::new();
        state.add(1, ts(1));
        state.add(2, ts(1));
        state.add(3, ts(1));
        state.remove(2, ts(2));
        state.remove(4, ts(2));

        let mut elements = state.elements();
        elements.sort();
        assert_eq!(elements, vec![1, 3]);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_merge_remove_bias_across_replicas() {
        let mut a = LwwState::new();
        a.add('x', ts(1));

        let mut b = LwwState::new();
        b.remove('x', ts(1));

        a.merge(&b);
        assert!(!a.contains(&'x'));
    }

    #[test]
    fn test_equal_requires_same_tombstones() {
        let mut a: LwwState<char, Timestamp> = LwwState::new();
        let mut b = LwwState::new();
        a.add('x', ts(1));
        b.add('x', ts(1));
        assert!(a.equal(&b));

        // same visible membership, different history
        a.add('y', ts(1));
        a.remove('y', ts(2));
        assert_eq!(a.elements(), b.elements());
        assert!(!a.equal(&b));
    }

    #[test]
    fn test_to_map_unified_view() {
        let mut state = LwwState::new();
        state.add('a', ts(1));
        state.add('b', ts(1));
        state.remove('b', ts(3));
        state.add('c', ts(4));
        state.remove('c', ts(2));
        state.remove('d', ts(7));
        state.add('e', ts(5));
        state.remove('e', ts(5));

        let view = state.to_map();
        assert_eq!(view.len(), 5);
        assert_eq!(view[&'a'], ElementState { is_removed: false, updated_at: ts(1) });
        assert_eq!(view[&'b'], ElementState { is_removed: true, updated_at: ts(3) });
        assert_eq!(view[&'c'], ElementState { is_removed: false, updated_at: ts(4) });
        assert_eq!(view[&'d'], ElementState { is_removed: true, updated_at: ts(7) });
        assert_eq!(view[&'e'], ElementState { is_removed: true, updated_at: ts(5) });
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut state = LwwState::new();
        state.add("a".to_string(), ts(1));
        state.remove("a".to_string(), ts(2));
        state.add("b".to_string(), ts(3));

        let restored = LwwState::from_snapshot(state.snapshot());
        assert!(restored.equal(&state));
        assert_eq!(restored.into_snapshot(), state.snapshot());
    }

    #[test]
    fn test_crdt_apply_replayed_operations() {
        let mut state: LwwState<String, Timestamp> = LwwState::new();
        state.apply(LwwOperation::add("x".to_string(), ts(10)));
        state.apply(LwwOperation::remove("x".to_string(), ts(9)));
        assert_eq!(state.value(), vec!["x".to_string()]);

        state.apply(LwwOperation::remove("x".to_string(), ts(10)));
        assert!(state.value().is_empty());
    }
}
