//! In-flight merge attempts of one coordinator.

use parking_lot::Mutex;
use shared_types::SequenceRange;
use std::collections::HashMap;
use tokio::time::Instant;
use uuid::Uuid;

type PairKey = (u64, SequenceRange, SequenceRange);

/// An outstanding merge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    pub id: Uuid,
    pub block_number: u64,
    pub left: SequenceRange,
    pub right: SequenceRange,
    pub started_at: Instant,
}

impl MergeJob {
    fn key(&self) -> PairKey {
        (self.block_number, self.left, self.right)
    }
}

/// Tracks attempts so the same pair is never in flight twice.
#[derive(Debug, Default)]
pub struct MergeJobTracker {
    jobs: Mutex<HashMap<PairKey, MergeJob>>,
}

impl MergeJobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attempt; `None` if the identical pair is already tracked.
    pub fn try_start(
        &self,
        block_number: u64,
        left: SequenceRange,
        right: SequenceRange,
        now: Instant,
    ) -> Option<MergeJob> {
        let mut jobs = self.jobs.lock();
        let key = (block_number, left, right);
        if jobs.contains_key(&key) {
            return None;
        }
        let job = MergeJob {
            id: Uuid::new_v4(),
            block_number,
            left,
            right,
            started_at: now,
        };
        jobs.insert(key, job.clone());
        Some(job)
    }

    /// Remove a finished, failed or abandoned attempt.
    pub fn finish(&self, job: &MergeJob) -> bool {
        let mut jobs = self.jobs.lock();
        match jobs.get(&job.key()) {
            Some(tracked) if tracked.id == job.id => jobs.remove(&job.key()).is_some(),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}
