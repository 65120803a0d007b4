/*
    CRDT subsystem - Conflict-Free Replicated Data Types

    Implements the LWW-Element-Set and the grow-only register it is built from.
*/

pub mod clock;
pub mod g_register;
pub mod lww_element_set;
pub mod lww_set;
pub mod traits;

pub use clock::{AnyClock, Clock, ClockKind, LamportClock, SystemClock};
pub use g_register::GrowOnlyRegister;
pub use lww_element_set::LwwElementSet;
pub use lww_set::{ElementState, ElementStatus, LwwSnapshot, LwwState};
pub use traits::{Crdt, LwwOperation};
