//! Settlement chain kept in process memory.

use crate::error::{SettlementError, SettlementResult};
use crate::ports::outbound::{SettlementChain, SettlementRequest};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::blake3_hash;
use shared_types::{SequenceRange, StateRoot, TxHandle};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// What the chain remembers about a settled block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettledEntry {
    pub tx: TxHandle,
    pub range: SequenceRange,
    pub end_root: StateRoot,
    pub memo: String,
}

/// Accepts each block once. Submissions must extend the last settled root.
#[derive(Default)]
pub struct MockSettlementChain {
    settled: RwLock<BTreeMap<u64, SettledEntry>>,
    unavailable: AtomicBool,
    submissions: AtomicU64,
}

impl MockSettlementChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settlement made by someone else.
    pub fn include_external(&self, block_number: u64, entry: SettledEntry) {
        self.settled.write().insert(block_number, entry);
    }

    pub fn entry(&self, block_number: u64) -> Option<SettledEntry> {
        self.settled.read().get(&block_number).cloned()
    }

    /// Submissions accepted through [`SettlementChain::submit`].
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Make every call fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> SettlementResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SettlementError::ChainUnavailable {
                reason: "settlement endpoint offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SettlementChain for MockSettlementChain {
    async fn submit(&self, request: SettlementRequest) -> SettlementResult<TxHandle> {
        self.check_available()?;
        let block_number = request.block_number;
        let mut settled = self.settled.write();

        if settled.contains_key(&block_number) {
            return Err(SettlementError::Refused {
                block_number,
                reason: "block already settled".to_string(),
            });
        }
        if let Some((_, last)) = settled.range(..block_number).next_back() {
            if last.end_root != request.proof.start_root {
                return Err(SettlementError::Refused {
                    block_number,
                    reason: "proof does not extend the settled state".to_string(),
                });
            }
        }

        let mut preimage = block_number.to_le_bytes().to_vec();
        preimage.extend_from_slice(&request.proof.end_root);
        let tx = TxHandle(format!("0x{}", hex::encode(&blake3_hash(&preimage)[..16])));

        settled.insert(
            block_number,
            SettledEntry {
                tx: tx.clone(),
                range: request.proof.range,
                end_root: request.proof.end_root,
                memo: request.memo,
            },
        );
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(tx)
    }

    async fn is_included(&self, block_number: u64) -> SettlementResult<bool> {
        self.check_available()?;
        Ok(self.settled.read().contains_key(&block_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::StateProof;

    fn request(block_number: u64, start: u64, end: u64, roots: (u8, u8)) -> SettlementRequest {
        SettlementRequest {
            block_number,
            proof: StateProof {
                block_number,
                range: SequenceRange::new(start, end).unwrap(),
                start_root: [roots.0; 32],
                end_root: [roots.1; 32],
                proof: vec![1, 2, 3],
            },
            memo: format!("block {block_number}"),
        }
    }

    #[tokio::test]
    async fn test_submit_once_per_block() {
        let chain = MockSettlementChain::new();
        let tx = chain.submit(request(1, 1, 4, (0, 1))).await.unwrap();
        assert!(tx.0.starts_with("0x"));
        assert!(chain.is_included(1).await.unwrap());

        let again = chain.submit(request(1, 1, 4, (0, 1))).await;
        assert!(matches!(again, Err(SettlementError::Refused { .. })));
        assert_eq!(chain.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_submission_must_extend_previous_root() {
        let chain = MockSettlementChain::new();
        chain.submit(request(1, 1, 4, (0, 1))).await.unwrap();

        let broken = chain.submit(request(2, 5, 6, (9, 2))).await;
        assert!(matches!(broken, Err(SettlementError::Refused { .. })));

        chain.submit(request(2, 5, 6, (1, 2))).await.unwrap();
        assert_eq!(chain.entry(2).unwrap().range, SequenceRange::new(5, 6).unwrap());
    }

    #[tokio::test]
    async fn test_outage() {
        let chain = MockSettlementChain::new();
        chain.set_unavailable(true);
        let err = chain.is_included(1).await.unwrap_err();
        assert!(err.is_transient());
        chain.set_unavailable(false);
        assert!(!chain.is_included(1).await.unwrap());
    }
}
