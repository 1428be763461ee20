//! Adapters for the sequencing feed.

mod memory_source;

pub use memory_source::InMemoryOperationSource;
