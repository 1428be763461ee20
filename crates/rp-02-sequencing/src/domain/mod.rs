//! Domain layer for the sequencing feed.

pub mod ledger;

pub use ledger::{Account, AccountLedger, LedgerViolation};
