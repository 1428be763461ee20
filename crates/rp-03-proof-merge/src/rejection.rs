//! Rejection Handler - flags records whose payload is gone.
//!
//! Rejected records stay in the registry for audit. Replacement coverage
//! comes from the sequencing feed or a peer merge, never from here.

use crate::error::MergeResult;
use crate::metrics;
use rp_01_proof_registry::{RejectOutcome, StatusRegistry};
use shared_bus::{EventPublisher, ProverEvent};
use shared_types::SequenceRange;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RejectionHandler<R: StatusRegistry> {
    registry: Arc<R>,
    events: Arc<dyn EventPublisher>,
}

impl<R: StatusRegistry> RejectionHandler<R> {
    pub fn new(registry: Arc<R>, events: Arc<dyn EventPublisher>) -> Self {
        Self { registry, events }
    }

    /// Flag the current record for `range` as REJECTED. Idempotent.
    pub async fn reject(
        &self,
        block_number: u64,
        range: SequenceRange,
    ) -> MergeResult<RejectOutcome> {
        let outcome = self.registry.reject_proof(block_number, range).await?;
        match outcome {
            RejectOutcome::Rejected => {
                warn!(
                    block = block_number,
                    range = %range,
                    "[rp-03] proof data unavailable, record rejected"
                );
                metrics::record_rejection();
                self.events
                    .publish(ProverEvent::ProofRejected {
                        block_number,
                        range,
                    })
                    .await;
            }
            RejectOutcome::AlreadyRejected => {
                debug!(block = block_number, range = %range, "[rp-03] record already rejected");
            }
            RejectOutcome::Consumed => {
                debug!(
                    block = block_number,
                    range = %range,
                    "[rp-03] record consumed before rejection"
                );
            }
        }
        Ok(outcome)
    }
}
