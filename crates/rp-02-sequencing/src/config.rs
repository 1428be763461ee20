//! Configuration for the sequencing feed

/// Sequencing feed configuration
#[derive(Clone, Debug)]
pub struct SequencingConfig {
    /// Operations pulled from the source per pass
    pub batch_size: usize,
    /// First sequence number the feed expects
    pub first_sequence: u64,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            first_sequence: 1,
        }
    }
}
