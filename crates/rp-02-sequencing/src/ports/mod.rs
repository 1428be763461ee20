//! Ports for the sequencing feed.

pub mod outbound;
