//! Cool-down cache for combined ranges whose merge attempt was abandoned.

use shared_types::SequenceRange;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Remembers when a combined range was last cooled down, per block.
#[derive(Debug, Clone)]
pub struct DedupCache {
    cooldown: Duration,
    entries: HashMap<(u64, SequenceRange), Instant>,
}

impl DedupCache {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: HashMap::new(),
        }
    }

    /// Stamp `range` at `now`, replacing any earlier stamp.
    pub fn record(&mut self, block_number: u64, range: SequenceRange, now: Instant) {
        self.entries.insert((block_number, range), now);
    }

    /// Whether `range` was stamped less than one cool-down before `now`.
    pub fn is_suppressed(&self, block_number: u64, range: &SequenceRange, now: Instant) -> bool {
        self.entries
            .get(&(block_number, *range))
            .is_some_and(|stamped| now.saturating_duration_since(*stamped) < self.cooldown)
    }

    /// Drop expired entries.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let cooldown = self.cooldown;
        self.entries
            .retain(|_, stamped| now.saturating_duration_since(*stamped) < cooldown);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
