//! Human-readable memo attached to a settlement submission.

use shared_types::SequenceRange;

/// `block {n} ({k} tx|txs: {start} - {end})`, cut to `max_len` characters.
pub fn settlement_memo(block_number: u64, range: &SequenceRange, max_len: usize) -> String {
    let count = range.len();
    let noun = if count == 1 { "tx" } else { "txs" };
    let memo = format!(
        "block {block_number} ({count} {noun}: {} - {})",
        range.start(),
        range.end()
    );
    memo.chars().take(max_len).collect()
}
