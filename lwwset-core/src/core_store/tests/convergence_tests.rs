/*
    Convergence tests - CRDT algebraic laws

    Properties checked over random operation histories:
    1. Commutativity: a ⊔ b == b ⊔ a
    2. Associativity: (a ⊔ b) ⊔ c == a ⊔ (b ⊔ c)
    3. Idempotence: a ⊔ a == a
    4. Removal bias on equal timestamps
    5. Monotonic record: stale timestamps never change stored state
    6. Replicas that exchange everything end up with the same members
*/

use crate::core_store::crdt::{Crdt, GrowOnlyRegister, LwwElementSet, LwwOperation, LwwState};
use crate::core_store::model::Timestamp;
use proptest::prelude::*;

fn op_strategy() -> impl Strategy<Value = LwwOperation<u8, Timestamp>> {
    (0u8..8, 0u64..20, any::<bool>()).prop_map(|(element, t, is_remove)| {
        if is_remove {
            LwwOperation::remove(element, Timestamp(t))
        } else {
            LwwOperation::add(element, Timestamp(t))
        }
    })
}

fn history() -> impl Strategy<Value = Vec<LwwOperation<u8, Timestamp>>> {
    prop::collection::vec(op_strategy(), 0..24)
}

fn build(ops: &[LwwOperation<u8, Timestamp>]) -> LwwState<u8, Timestamp> {
    let mut state = LwwState::new();
    for op in ops {
        state.apply(op.clone());
    }
    state
}

fn merged(a: &LwwState<u8, Timestamp>, b: &LwwState<u8, Timestamp>) -> LwwState<u8, Timestamp> {
    let mut out = a.clone();
    out.merge(b);
    out
}

fn sorted(mut elements: Vec<u8>) -> Vec<u8> {
    elements.sort_unstable();
    elements
}

proptest! {
    #[test]
    fn prop_merge_commutative(a in history(), b in history()) {
        let (a, b) = (build(&a), build(&b));
        prop_assert!(merged(&a, &b).equal(&merged(&b, &a)));
    }

    #[test]
    fn prop_merge_associative(a in history(), b in history(), c in history()) {
        let (a, b, c) = (build(&a), build(&b), build(&c));
        let left = merged(&merged(&a, &b), &c);
        let right = merged(&a, &merged(&b, &c));
        prop_assert!(left.equal(&right));
    }

    #[test]
    fn prop_merge_idempotent(a in history()) {
        let a = build(&a);
        let twice = merged(&a, &a);
        prop_assert!(twice.equal(&a));
        prop_assert_eq!(sorted(twice.elements()), sorted(a.elements()));
    }

    #[test]
    fn prop_merge_equals_replaying_both_histories(a in history(), b in history()) {
        let mut all = a.clone();
        all.extend(b.iter().cloned());
        prop_assert!(merged(&build(&a), &build(&b)).equal(&build(&all)));
    }

    #[test]
    fn prop_tie_is_removed(element in 0u8..8, t in 0u64..1_000, add_first in any::<bool>()) {
        let mut state = LwwState::new();
        if add_first {
            state.add(element, Timestamp(t));
            state.remove(element, Timestamp(t));
        } else {
            state.remove(element, Timestamp(t));
            state.add(element, Timestamp(t));
        }
        prop_assert!(!state.contains(&element));
    }

    #[test]
    fn prop_stale_record_is_ignored(element in 0u8..8, newer in 1u64..1_000, back in 0u64..1_000) {
        let mut register = GrowOnlyRegister::new();
        register.record(element, Timestamp(newer));
        let older = Timestamp(newer.saturating_sub(back));

        prop_assert!(!register.record(element, older));
        prop_assert_eq!(register.lookup(&element), (Timestamp(newer), true));
    }

    #[test]
    fn prop_membership_follows_latest_timestamps(ops in history()) {
        let state = build(&ops);
        for element in 0u8..8 {
            let latest_add = ops.iter()
                .filter(|op| !op.is_remove() && *op.element() == element)
                .map(|op| *op.timestamp())
                .max();
            let latest_remove = ops.iter()
                .filter(|op| op.is_remove() && *op.element() == element)
                .map(|op| *op.timestamp())
                .max();

            let expected = match (latest_add, latest_remove) {
                (Some(add), Some(remove)) => add > remove,
                (Some(_), None) => true,
                (None, _) => false,
            };
            prop_assert_eq!(state.contains(&element), expected);
        }
    }

    #[test]
    fn prop_shared_sets_converge(a in history(), b in history(), c in history()) {
        let sets: Vec<LwwElementSet<u8>> = [a, b, c]
            .iter()
            .map(|ops| LwwElementSet::from_state(build(ops)))
            .collect();

        for i in 0..sets.len() {
            for j in 0..sets.len() {
                sets[i].merge(&sets[j]);
            }
        }
        // second round so earlier targets see later merges
        for i in 0..sets.len() {
            for j in 0..sets.len() {
                sets[i].merge(&sets[j]);
            }
        }

        prop_assert!(sets[0].equal(&sets[1]));
        prop_assert!(sets[1].equal(&sets[2]));
        prop_assert_eq!(sorted(sets[0].elements()), sorted(sets[2].elements()));
    }
}

#[test]
fn test_empty_states_are_equal() {
    let a: LwwState<u8, Timestamp> = LwwState::new();
    let b: LwwState<u8, Timestamp> = LwwState::new();
    assert!(a.equal(&b));
    assert!(merged(&a, &b).equal(&a));
}
