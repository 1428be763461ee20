//! # Adapters
//!
//! Port implementations connecting one subsystem to another.

pub mod settlement;

pub use settlement::SettlementAdapter;
