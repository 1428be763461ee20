//! Adapters for the merge coordinator.

mod no_settlement;

pub use no_settlement::NoSettlement;
