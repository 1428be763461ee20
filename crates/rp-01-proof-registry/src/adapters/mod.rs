//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the registry and blob store ports.

mod memory_blob_store;
mod memory_registry;

pub use memory_blob_store::InMemoryBlobStore;
pub use memory_registry::InMemoryStatusRegistry;
