//! Ports for the settlement submitter.

pub mod outbound;
