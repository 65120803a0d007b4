/*
    Tests for the core_store subsystem

    Test suite covering:
    - LWW-Element-Set scenarios and tie-breaking
    - Multi-replica merge chains
    - CRDT algebraic laws (property based)
*/

pub mod convergence_tests;
