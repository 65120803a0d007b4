/*
    g_register.rs - Grow-only timestamp register

    A grow-only map from element to the latest timestamp recorded for it.
    Keys are never removed and a stored timestamp only ever moves forward,
    so merge is a plain pointwise maximum: commutative, associative and
    idempotent.

    Used as the add-set and the remove-set of the LWW-Element-Set.
*/

use super::traits::Crdt;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{Entry, Iter};
use std::collections::HashMap;
use std::hash::Hash;

/// Grow-only register of `element -> latest timestamp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowOnlyRegister<E: Eq + Hash, T> {
    entries: HashMap<E, T>,
}

impl<E, T> GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    /// Create a new empty register
    pub fn new() -> Self {
        GrowOnlyRegister { entries: HashMap::new() }
    }

    /// Rehydrate a register from a previously exported map
    pub fn from_map(entries: HashMap<E, T>) -> Self {
        GrowOnlyRegister { entries }
    }

    /// Record `element` at `timestamp`.
    ///
    /// Inserts absent elements. An existing timestamp is replaced only by a
    /// strictly greater one; equal or older timestamps are ignored.
    /// Returns whether the stored state changed.
    pub fn record(&mut self, element: E, timestamp: T) -> bool {
        match self.entries.entry(element) {
            Entry::Vacant(slot) => {
                slot.insert(timestamp);
                true
            }
            Entry::Occupied(mut slot) => {
                if timestamp > *slot.get() {
                    slot.insert(timestamp);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Latest timestamp for `element` and whether it was ever recorded.
    /// Unrecorded elements yield the sentinel `T::default()`.
    pub fn lookup(&self, element: &E) -> (T, bool) {
        match self.entries.get(element) {
            Some(ts) => (ts.clone(), true),
            None => (T::default(), false),
        }
    }

    /// Borrowing variant of [`lookup`](Self::lookup)
    pub fn get(&self, element: &E) -> Option<&T> {
        self.entries.get(element)
    }

    pub fn contains(&self, element: &E) -> bool {
        self.entries.contains_key(element)
    }

    /// Fold every record of `other` into this register.
    /// Returns the number of entries that changed.
    pub fn merge(&mut self, other: &GrowOnlyRegister<E, T>) -> usize {
        self.entries.reserve(other.entries.len());

        let mut changed = 0;
        for (element, timestamp) in &other.entries {
            if self.record(element.clone(), timestamp.clone()) {
                changed += 1;
            }
        }
        changed
    }

    /// Same elements with identical timestamps
    pub fn equal(&self, other: &GrowOnlyRegister<E, T>) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }

        self.entries
            .iter()
            .all(|(element, ts)| other.entries.get(element) == Some(ts))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, E, T> {
        self.entries.iter()
    }

    /// Owned copy of the underlying map
    pub fn to_map(&self) -> HashMap<E, T> {
        self.entries.clone()
    }

    pub fn into_map(self) -> HashMap<E, T> {
        self.entries
    }
}

impl<E, T> Crdt for GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone + Send + Sync,
    T: Ord + Clone + Default + Send + Sync,
{
    type Operation = (E, T);
    type Value = HashMap<E, T>;

    fn apply(&mut self, (element, timestamp): Self::Operation) {
        self.record(element, timestamp);
    }

    fn merge(&mut self, other: &Self) {
        GrowOnlyRegister::merge(self, other);
    }

    fn value(&self) -> Self::Value {
        self.to_map()
    }
}

impl<E, T> PartialEq for GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<E, T> Eq for GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
}

impl<E, T> Default for GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> FromIterator<(E, T)> for GrowOnlyRegister<E, T>
where
    E: Eq + Hash + Clone,
    T: Ord + Clone + Default,
{
    /// Records every pair in order, so duplicates keep their latest timestamp
    fn from_iter<I: IntoIterator<Item = (E, T)>>(iter: I) -> Self {
        let mut register = GrowOnlyRegister::new();
        for (element, timestamp) in iter {
            register.record(element, timestamp);
        }
        register
    }
}
