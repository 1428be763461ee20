//! Account-state map the feed applies operations to.

use serde::{Deserialize, Serialize};
use shared_crypto::blake3_hash;
use shared_types::{AccountId, CodecError, OperationKind, StateRoot};
use std::collections::BTreeMap;
use thiserror::Error;

/// Balance and nonce of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u64,
    pub nonce: u64,
}

/// Business-rule violation; the ledger is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerViolation {
    #[error("{account} has {balance}, needs {requested}")]
    InsufficientBalance {
        account: AccountId,
        balance: u64,
        requested: u64,
    },

    #[error("transfer from {account} to itself")]
    SelfTransfer { account: AccountId },

    #[error("balance overflow on {account}")]
    Overflow { account: AccountId },
}

impl LedgerViolation {
    /// Metric label.
    pub fn rule(&self) -> &'static str {
        match self {
            LedgerViolation::InsufficientBalance { .. } => "insufficient_balance",
            LedgerViolation::SelfTransfer { .. } => "self_transfer",
            LedgerViolation::Overflow { .. } => "overflow",
        }
    }
}

/// Ordered account map with a canonical state root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountLedger {
    accounts: BTreeMap<AccountId, Account>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: AccountId) -> Account {
        self.accounts.get(&id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// BLAKE3 over the bincode encoding of the account map.
    pub fn state_root(&self) -> Result<StateRoot, CodecError> {
        let bytes =
            bincode::serialize(&self.accounts).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(blake3_hash(&bytes))
    }

    /// Apply one operation, or leave the ledger untouched on violation.
    pub fn apply(&mut self, kind: &OperationKind) -> Result<(), LedgerViolation> {
        match *kind {
            OperationKind::Deposit { account, amount } => {
                let mut credited = self.account(account);
                credited.balance = credited
                    .balance
                    .checked_add(amount)
                    .ok_or(LedgerViolation::Overflow { account })?;
                credited.nonce += 1;
                self.accounts.insert(account, credited);
            }
            OperationKind::Withdraw { account, amount } => {
                let mut debited = self.debit(account, amount)?;
                debited.nonce += 1;
                self.accounts.insert(account, debited);
            }
            OperationKind::Transfer { from, to, amount } => {
                if from == to {
                    return Err(LedgerViolation::SelfTransfer { account: from });
                }
                let mut debited = self.debit(from, amount)?;
                let mut credited = self.account(to);
                credited.balance = credited
                    .balance
                    .checked_add(amount)
                    .ok_or(LedgerViolation::Overflow { account: to })?;
                debited.nonce += 1;
                credited.nonce += 1;
                self.accounts.insert(from, debited);
                self.accounts.insert(to, credited);
            }
        }
        Ok(())
    }

    fn debit(&self, account: AccountId, amount: u64) -> Result<Account, LedgerViolation> {
        let mut current = self.account(account);
        if current.balance < amount {
            return Err(LedgerViolation::InsufficientBalance {
                account,
                balance: current.balance,
                requested: amount,
            });
        }
        current.balance -= amount;
        Ok(current)
    }
}
