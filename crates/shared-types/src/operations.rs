//! # Ledger Operations
//!
//! Operations consumed by the sequencing feed, one per sequence number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

/// What an operation does to the account-state map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Credit an account, creating it if absent.
    Deposit { account: AccountId, amount: u64 },
    /// Debit an existing account.
    Withdraw { account: AccountId, amount: u64 },
    /// Move funds between two distinct accounts.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
}

impl OperationKind {
    /// Short name for logs and memos.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Deposit { .. } => "deposit",
            OperationKind::Withdraw { .. } => "withdraw",
            OperationKind::Transfer { .. } => "transfer",
        }
    }
}

/// A sequenced ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Block the operation was sequenced into.
    pub block_number: u64,
    /// Global sequence number.
    pub sequence: u64,
    /// Effect on the ledger.
    pub kind: OperationKind,
}
