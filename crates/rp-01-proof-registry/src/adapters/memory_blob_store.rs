//! In-memory, content-addressed blob store.

use crate::error::{RegistryError, RegistryResult};
use crate::ports::outbound::BlobStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::blake3_hex;
use shared_types::DataHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Blob store keyed by the hex BLAKE3 digest of the content.
///
/// `forget` and `set_unavailable` simulate lost blobs and outages.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
    reads: AtomicU64,
}

impl InMemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a blob, as if the storage network lost it.
    pub fn forget(&self, handle: &DataHandle) -> bool {
        self.blobs.write().remove(handle.as_str()).is_some()
    }

    /// Make every call fail with `Unavailable` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Number of read calls served.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> RegistryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable {
                reason: "blob store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn save(&self, bytes: Vec<u8>) -> RegistryResult<DataHandle> {
        self.check_available()?;
        let key = blake3_hex(&bytes);
        self.blobs.write().entry(key.clone()).or_insert(bytes);
        Ok(DataHandle::new(key))
    }

    async fn read(&self, handle: &DataHandle) -> RegistryResult<Vec<u8>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.blobs
            .read()
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::BlobNotFound {
                handle: handle.clone(),
            })
    }
}
