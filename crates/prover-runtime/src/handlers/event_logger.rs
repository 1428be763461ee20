//! Logs and meters every event published on the bus.

use tokio::sync::watch;
use tracing::info;

use prover_telemetry::{log_event, EVENT_BUS_EVENTS, LAST_SETTLED_BLOCK, SUBSYSTEM_ERRORS};
use shared_bus::{subsystem, ProverEvent, Subscription};

/// Log label for a subsystem id.
fn subsystem_label(id: u8) -> &'static str {
    match id {
        subsystem::REGISTRY => "rp-01",
        subsystem::SEQUENCING => "rp-02",
        subsystem::PROOF_MERGE => "rp-03",
        subsystem::SETTLEMENT => "rp-04",
        _ => "unknown",
    }
}

pub struct EventLogger {
    subscription: Subscription,
}

impl EventLogger {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Drain the subscription until the bus closes or shutdown is signalled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => observe(&event),
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("[runtime] event logger stopped");
    }
}

/// Record one event in logs and metrics.
pub fn observe(event: &ProverEvent) {
    let source = subsystem_label(event.source_subsystem());
    EVENT_BUS_EVENTS
        .with_label_values(&[event.name(), source])
        .inc();

    match event {
        ProverEvent::ProofSubmitted {
            block_number,
            range,
            ..
        } => log_event!(debug, source, "singleton recorded", block = block_number, range = %range),
        ProverEvent::OperationFailed {
            block_number,
            sequence,
            reason,
        } => log_event!(
            warn,
            source,
            "operation failed",
            block = block_number,
            sequence = sequence,
            reason = %reason
        ),
        ProverEvent::ProofsMerged {
            block_number,
            left,
            right,
            ..
        } => log_event!(
            info,
            source,
            "proofs merged",
            block = block_number,
            left = %left,
            right = %right
        ),
        ProverEvent::ProofRejected {
            block_number,
            range,
        } => log_event!(warn, source, "proof rejected", block = block_number, range = %range),
        ProverEvent::MergeAbandoned {
            block_number,
            left,
            right,
        } => log_event!(
            warn,
            source,
            "merge abandoned",
            block = block_number,
            left = %left,
            right = %right
        ),
        ProverEvent::BlockSettled { block_number, tx } => {
            if *block_number as f64 > LAST_SETTLED_BLOCK.get() {
                LAST_SETTLED_BLOCK.set(*block_number as f64);
            }
            log_event!(info, source, "block settled", block = block_number, tx = %tx)
        }
        ProverEvent::CriticalError { error, .. } => {
            SUBSYSTEM_ERRORS
                .with_label_values(&[source, "critical"])
                .inc();
            log_event!(error, source, "critical error", error = %error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use shared_types::{SequenceRange, TxHandle};
    use std::time::Duration;

    #[test]
    fn test_observe_counts_events() {
        let event = ProverEvent::ProofRejected {
            block_number: 2,
            range: SequenceRange::single(4),
        };
        let before = EVENT_BUS_EVENTS
            .with_label_values(&[event.name(), "rp-03"])
            .get();
        observe(&event);
        let after = EVENT_BUS_EVENTS
            .with_label_values(&[event.name(), "rp-03"])
            .get();
        assert!(after >= before + 1.0);
    }

    #[test]
    fn test_settled_gauge_only_moves_forward() {
        observe(&ProverEvent::BlockSettled {
            block_number: 1_000,
            tx: TxHandle("0x1".to_string()),
        });
        observe(&ProverEvent::BlockSettled {
            block_number: 3,
            tx: TxHandle("0x2".to_string()),
        });
        assert!(LAST_SETTLED_BLOCK.get() >= 1_000.0);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let bus = InMemoryEventBus::new();
        let logger = EventLogger::new(bus.subscribe(EventFilter::all()));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(logger.run(rx));

        bus.publish(ProverEvent::CriticalError {
            subsystem_id: subsystem::SETTLEMENT,
            error: "continuity".to_string(),
        })
        .await;
        tx.send_replace(true);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
