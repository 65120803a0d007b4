/*
    model - Value types shared by the CRDT layer
*/

pub mod types;

pub use types::Timestamp;
