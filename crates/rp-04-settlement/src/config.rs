//! Configuration for the settlement submitter

/// Settlement configuration
#[derive(Clone, Debug)]
pub struct SettlementConfig {
    /// Maximum characters in a submission memo
    pub memo_max_len: usize,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { memo_max_len: 30 }
    }
}
