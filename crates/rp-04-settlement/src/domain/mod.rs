//! Domain layer for settlement.

pub mod memo;
pub mod outcome;

pub use memo::settlement_memo;
pub use outcome::{NotReady, SettlementOutcome};
