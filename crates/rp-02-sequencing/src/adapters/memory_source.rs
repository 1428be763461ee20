//! Operation source backed by an in-process log.

use crate::error::{SequencingError, SequencingResult};
use crate::ports::outbound::OperationSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Operation;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Operations keyed by sequence. Pushing an existing sequence replaces it.
#[derive(Default)]
pub struct InMemoryOperationSource {
    operations: RwLock<BTreeMap<u64, Operation>>,
    unavailable: AtomicBool,
}

impl InMemoryOperationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, operation: Operation) {
        self.operations.write().insert(operation.sequence, operation);
    }

    pub fn extend(&self, operations: impl IntoIterator<Item = Operation>) {
        let mut log = self.operations.write();
        for operation in operations {
            log.insert(operation.sequence, operation);
        }
    }

    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.read().is_empty()
    }

    /// Make fetches fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl OperationSource for InMemoryOperationSource {
    async fn fetch_operations(
        &self,
        from_sequence: u64,
        limit: usize,
    ) -> SequencingResult<Vec<Operation>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SequencingError::Source {
                reason: "operation log offline".to_string(),
            });
        }
        Ok(self
            .operations
            .read()
            .range(from_sequence..)
            .take(limit)
            .map(|(_, op)| op.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccountId, OperationKind};

    fn deposit(sequence: u64) -> Operation {
        Operation {
            block_number: 1,
            sequence,
            kind: OperationKind::Deposit {
                account: AccountId(1),
                amount: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_fetch_is_ordered_and_bounded() {
        let source = InMemoryOperationSource::new();
        source.extend([deposit(3), deposit(1), deposit(2)]);

        let ops = source.fetch_operations(2, 5).await.unwrap();
        let sequences: Vec<u64> = ops.iter().map(|o| o.sequence).collect();
        assert_eq!(sequences, vec![2, 3]);

        let first = source.fetch_operations(1, 1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].sequence, 1);
    }

    #[tokio::test]
    async fn test_unavailable_source_is_transient() {
        let source = InMemoryOperationSource::new();
        source.set_unavailable(true);

        let err = source.fetch_operations(1, 1).await.unwrap_err();
        assert!(err.is_transient());
    }
}
