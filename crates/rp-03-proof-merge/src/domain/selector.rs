//! Merge candidate selection.
//!
//! `select` is a pure function of a block snapshot, the coordinator's
//! selection history and the current instant. Given the same three inputs it
//! always returns the same candidate.
//!
//! ```text
//! Phase A (finalize): end known -> first split i in start+1..=end with
//!                     CALCULATED [start, i-1] and [i, end]
//! Phase B (general):  first adjacent CALCULATED pair in recorded order that
//!                     is not guarded, not already merged, not cooling down
//! ```

use super::dedup::DedupCache;
use shared_types::{BlockProofState, ProofRecord, SequenceRange};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Which phase produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Finalize,
    General,
}

/// An adjacent pair of CALCULATED records to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    pub block_number: u64,
    pub left: ProofRecord,
    pub right: ProofRecord,
    pub combined: SequenceRange,
    pub phase: SelectionPhase,
}

impl MergeCandidate {
    fn new(
        block_number: u64,
        left: &ProofRecord,
        right: &ProofRecord,
        phase: SelectionPhase,
    ) -> Option<Self> {
        let combined = left.range.concat(&right.range).ok()?;
        Some(Self {
            block_number,
            left: left.clone(),
            right: right.clone(),
            combined,
            phase,
        })
    }
}

/// Per-coordinator memory consulted and updated by `select`.
#[derive(Debug, Clone)]
pub struct SelectionHistory {
    last_selected: HashMap<u64, (SequenceRange, SequenceRange)>,
    dedup: DedupCache,
}

impl SelectionHistory {
    pub fn new(dedup_cooldown: Duration) -> Self {
        Self {
            last_selected: HashMap::new(),
            dedup: DedupCache::new(dedup_cooldown),
        }
    }

    /// Pair most recently selected for `block_number`.
    pub fn last_selected(&self, block_number: u64) -> Option<(SequenceRange, SequenceRange)> {
        self.last_selected.get(&block_number).copied()
    }

    pub fn dedup(&self) -> &DedupCache {
        &self.dedup
    }

    /// Cool down a combined range, e.g. after an abandoned attempt.
    pub fn refresh_dedup(&mut self, block_number: u64, combined: SequenceRange, now: Instant) {
        self.dedup.record(block_number, combined, now);
    }

    /// Forget state for blocks that no longer need merging.
    pub fn forget_block(&mut self, block_number: u64) {
        self.last_selected.remove(&block_number);
    }

    pub fn prune(&mut self, now: Instant) -> usize {
        self.dedup.prune(now)
    }

    fn is_guarded(&self, block_number: u64, range: &SequenceRange) -> bool {
        self.last_selected
            .get(&block_number)
            .is_some_and(|(a, b)| a == range || b == range)
    }

    fn remember(&mut self, candidate: &MergeCandidate) {
        self.last_selected.insert(
            candidate.block_number,
            (candidate.left.range, candidate.right.range),
        );
    }
}

/// Pick the next pair to merge in `state`, or `None`.
///
/// A selection is remembered in `history`; a block with no candidate has its
/// progress guard cleared so a failed pair can come back after its cool-down.
pub fn select(
    state: &BlockProofState,
    history: &mut SelectionHistory,
    now: Instant,
) -> Option<MergeCandidate> {
    if state.is_finished {
        return None;
    }

    let candidate =
        finalize_pair(state, history, now).or_else(|| general_pair(state, history, now));
    match &candidate {
        Some(candidate) => history.remember(candidate),
        None => history.forget_block(state.block_number),
    }
    candidate
}

fn finalize_pair(
    state: &BlockProofState,
    history: &SelectionHistory,
    now: Instant,
) -> Option<MergeCandidate> {
    let full = state.full_range()?;
    if history.dedup.is_suppressed(state.block_number, &full, now) {
        return None;
    }

    for split in full.start() + 1..=full.end() {
        let (Ok(left), Ok(right)) = (
            SequenceRange::new(full.start(), split - 1),
            SequenceRange::new(split, full.end()),
        ) else {
            continue;
        };
        let (Some(a), Some(b)) = (state.calculated_record(&left), state.calculated_record(&right))
        else {
            continue;
        };
        return MergeCandidate::new(state.block_number, a, b, SelectionPhase::Finalize);
    }
    None
}

fn general_pair(
    state: &BlockProofState,
    history: &SelectionHistory,
    now: Instant,
) -> Option<MergeCandidate> {
    let block = state.block_number;
    let calculated: Vec<&ProofRecord> = state.calculated_records().collect();

    for a in &calculated {
        if history.is_guarded(block, &a.range) {
            continue;
        }
        for b in &calculated {
            if !a.range.is_adjacent_to(&b.range) || history.is_guarded(block, &b.range) {
                continue;
            }
            let Ok(combined) = a.range.concat(&b.range) else {
                continue;
            };
            if state.calculated_record(&combined).is_some() {
                continue;
            }
            if history.dedup.is_suppressed(block, &combined, now) {
                continue;
            }
            return MergeCandidate::new(block, a, b, SelectionPhase::General);
        }
    }
    None
}
