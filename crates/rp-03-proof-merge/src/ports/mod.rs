//! Ports for the merge coordinator.

pub mod outbound;
