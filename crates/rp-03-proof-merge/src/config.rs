//! Configuration for the merge coordinator

use std::time::Duration;

/// Merge coordinator configuration
#[derive(Clone, Debug)]
pub struct MergeConfig {
    /// Identifier used in logs and events
    pub instance_id: String,
    /// Sleep between coordinator passes
    pub poll_interval: Duration,
    /// Budget for one merge attempt before it is abandoned
    pub attempt_timeout: Duration,
    /// How long a selected combined range is suppressed from re-selection
    pub dedup_cooldown: Duration,
    /// Maximum number of unsettled blocks scanned per pass
    pub window_blocks: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            instance_id: "0".to_string(),
            poll_interval: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(120),
            dedup_cooldown: Duration::from_secs(60),
            window_blocks: 16,
        }
    }
}
