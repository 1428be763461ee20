//! Coordinator Loop
//!
//! One pass:
//!
//! ```text
//! chain_status ──→ window [last_settled + 1, min(current, + window_blocks - 1)]
//!     for each block: get_block ──→ select ──→ spawn attempt ──→ await (timeout)
//!     for each block: settle_if_ready (ascending)
//! ```
//!
//! Attempts run as spawned tasks bounded by `attempt_timeout`. On timeout the
//! attempt is told to cancel, its combined range enters the dedup cache and
//! a `MergeAbandoned` event is published; nothing needs rolling back since
//! the registry write is the only commit point. A transient failure clears
//! the block's progress guard so the next pass retries the same pair.
//!
//! Several coordinators may share one registry. Selection history, dedup
//! cache and job tracker belong to a single instance.

use crate::config::MergeConfig;
use crate::domain::{
    select, Clock, MergeCandidate, MergeJobTracker, SelectionHistory, TokioClock,
};
use crate::error::{MergeError, MergeErrorKind, MergeResult};
use crate::executor::{cancellation, MergeExecutor, MergeOutcome};
use crate::metrics;
use crate::ports::outbound::{BlockSettlement, SettlementProgress};
use parking_lot::Mutex;
use rp_01_proof_registry::{BlobStore, RegistryError, StatusRegistry};
use shared_bus::{subsystem, EventPublisher, ProverEvent};
use shared_crypto::{ProofMerger, ProofVerifier};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub blocks_scanned: usize,
    pub candidates: usize,
    pub merged: usize,
    pub conflicts: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub abandoned: usize,
    pub failed: usize,
    pub settled: usize,
}

impl PassReport {
    pub fn has_activity(&self) -> bool {
        self.candidates > 0 || self.settled > 0 || self.failed > 0
    }
}

pub struct Coordinator<R, B, V, M, S>
where
    R: StatusRegistry + 'static,
    B: BlobStore + 'static,
    V: ProofVerifier + 'static,
    M: ProofMerger + 'static,
    S: BlockSettlement,
{
    config: MergeConfig,
    registry: Arc<R>,
    executor: Arc<MergeExecutor<R, B, V, M>>,
    settlement: Arc<S>,
    events: Arc<dyn EventPublisher>,
    history: Mutex<SelectionHistory>,
    jobs: MergeJobTracker,
    clock: Arc<dyn Clock>,
}

impl<R, B, V, M, S> Coordinator<R, B, V, M, S>
where
    R: StatusRegistry + 'static,
    B: BlobStore + 'static,
    V: ProofVerifier + 'static,
    M: ProofMerger + 'static,
    S: BlockSettlement,
{
    pub fn new(
        config: MergeConfig,
        registry: Arc<R>,
        executor: Arc<MergeExecutor<R, B, V, M>>,
        settlement: Arc<S>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let history = SelectionHistory::new(config.dedup_cooldown);
        Self {
            config,
            registry,
            executor,
            settlement,
            events,
            history: Mutex::new(history),
            jobs: MergeJobTracker::new(),
            clock: Arc::new(TokioClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn instance_id(&self) -> &str {
        &self.config.instance_id
    }

    /// Attempts currently in flight.
    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Copy of the selection history.
    pub fn history(&self) -> SelectionHistory {
        self.history.lock().clone()
    }

    /// Run passes every `poll_interval` until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(instance = %self.config.instance_id, "[rp-03] coordinator started");
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_pass().await {
                        Ok(report) if report.has_activity() => info!(
                            instance = %self.config.instance_id,
                            merged = report.merged,
                            conflicts = report.conflicts,
                            rejected = report.rejected,
                            abandoned = report.abandoned,
                            failed = report.failed,
                            settled = report.settled,
                            "[rp-03] pass complete"
                        ),
                        Ok(_) => {}
                        Err(error) => warn!(
                            instance = %self.config.instance_id,
                            %error,
                            "[rp-03] pass failed"
                        ),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(instance = %self.config.instance_id, "[rp-03] coordinator stopped");
    }

    /// One select/merge/settle sweep over the block window.
    pub async fn run_pass(&self) -> MergeResult<PassReport> {
        let mut report = PassReport::default();
        let window = self.window().await?;
        self.history.lock().prune(self.clock.now());

        for block_number in window.clone() {
            let state = match self.registry.get_block(block_number).await {
                Ok(state) => state,
                Err(RegistryError::BlockNotFound { .. }) => continue,
                Err(error) => {
                    warn!(block = block_number, %error, "[rp-03] block snapshot failed");
                    report.failed += 1;
                    continue;
                }
            };
            report.blocks_scanned += 1;

            let now = self.clock.now();
            let candidate = select(&state, &mut self.history.lock(), now);
            if let Some(candidate) = candidate {
                report.candidates += 1;
                self.attempt(candidate, &mut report).await;
            }
        }

        for block_number in window {
            match self.settlement.settle_if_ready(block_number).await {
                Ok(SettlementProgress::Settled) => {
                    report.settled += 1;
                    self.history.lock().forget_block(block_number);
                }
                Ok(SettlementProgress::AlreadySettled | SettlementProgress::NotReady) => {}
                Err(error) => {
                    report.failed += 1;
                    self.report_error(&error).await;
                }
            }
        }

        metrics::record_pass();
        Ok(report)
    }

    async fn window(&self) -> MergeResult<RangeInclusive<u64>> {
        let status = self.registry.chain_status().await?;
        let first = status.last_settled_block + 1;
        let span = self.config.window_blocks.saturating_sub(1);
        let last = status.current_block.min(first.saturating_add(span));
        Ok(first..=last)
    }

    async fn attempt(&self, candidate: MergeCandidate, report: &mut PassReport) {
        let block_number = candidate.block_number;
        let Some(job) = self.jobs.try_start(
            block_number,
            candidate.left.range,
            candidate.right.range,
            self.clock.now(),
        ) else {
            debug!(
                block = block_number,
                range = %candidate.combined,
                "[rp-03] pair already in flight"
            );
            return;
        };
        metrics::set_active_jobs(self.jobs.len());
        debug!(
            job = %job.id,
            block = block_number,
            left = %candidate.left.range,
            right = %candidate.right.range,
            "[rp-03] merge attempt started"
        );

        let (cancel, token) = cancellation();
        let executor = Arc::clone(&self.executor);
        let task_candidate = candidate.clone();
        let mut task =
            tokio::spawn(async move { executor.execute(&task_candidate, &token).await });

        let result = tokio::time::timeout(self.config.attempt_timeout, &mut task).await;
        self.jobs.finish(&job);
        metrics::set_active_jobs(self.jobs.len());
        let elapsed = self.clock.now().saturating_duration_since(job.started_at);

        match result {
            Ok(Ok(Ok(outcome))) => {
                metrics::record_attempt(outcome.label(), elapsed.as_secs_f64());
                match outcome {
                    MergeOutcome::Merged { .. } => report.merged += 1,
                    MergeOutcome::Conflict => report.conflicts += 1,
                    MergeOutcome::Rejected(_) => report.rejected += 1,
                    MergeOutcome::Cancelled => report.cancelled += 1,
                }
            }
            Ok(Ok(Err(error))) => {
                report.failed += 1;
                if error.is_transient() {
                    self.history.lock().forget_block(block_number);
                }
                self.report_error(&error).await;
            }
            Ok(Err(join_error)) => {
                report.failed += 1;
                self.history.lock().forget_block(block_number);
                self.report_error(&MergeError::TransientIo {
                    reason: join_error.to_string(),
                })
                .await;
            }
            Err(_) => {
                cancel.cancel();
                report.abandoned += 1;
                self.abandon(&candidate).await;
            }
        }
    }

    async fn abandon(&self, candidate: &MergeCandidate) {
        let timeout = MergeError::Timeout {
            block_number: candidate.block_number,
            left: candidate.left.range,
            right: candidate.right.range,
            after: self.config.attempt_timeout,
        };
        warn!(
            instance = %self.config.instance_id,
            error = %timeout,
            "[rp-03] merge attempt abandoned"
        );
        metrics::record_error(timeout.kind().as_str());

        let now = self.clock.now();
        self.history
            .lock()
            .refresh_dedup(candidate.block_number, candidate.combined, now);

        self.events
            .publish(ProverEvent::MergeAbandoned {
                block_number: candidate.block_number,
                left: candidate.left.range,
                right: candidate.right.range,
            })
            .await;
    }

    async fn report_error(&self, error: &MergeError) {
        metrics::record_error(error.kind().as_str());
        match error.kind() {
            MergeErrorKind::InvalidProof | MergeErrorKind::Settlement => {
                error!(
                    instance = %self.config.instance_id,
                    %error,
                    "[rp-03] needs operator attention"
                );
                self.events
                    .publish(ProverEvent::CriticalError {
                        subsystem_id: subsystem::PROOF_MERGE,
                        error: error.to_string(),
                    })
                    .await;
            }
            MergeErrorKind::TransientIo | MergeErrorKind::Timeout | MergeErrorKind::Registry => {
                warn!(
                    instance = %self.config.instance_id,
                    %error,
                    "[rp-03] attempt failed, retrying next pass"
                );
            }
        }
    }
}
