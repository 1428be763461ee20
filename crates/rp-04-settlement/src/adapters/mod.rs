//! Adapters for the settlement submitter.

mod mock_chain;

pub use mock_chain::{MockSettlementChain, SettledEntry};
