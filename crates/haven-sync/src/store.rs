//! Snapshot store abstraction
//!
//! The persisted allowlist snapshot lives in an injected key-value store;
//! this crate only defines the interface and an in-memory implementation.
//! The CLI ships a file-backed store.

use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use haven_core::AllowlistSnapshot;

/// Boxed error for wrapping backend-specific errors
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Snapshot could not be read
    #[error("snapshot read failed: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// Snapshot could not be written
    #[error("snapshot write failed: {message}")]
    Write {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// Stored bytes are not a valid snapshot
    #[error("snapshot corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for the single allowlist snapshot value.
///
/// `load` returning `Ok(None)` means "no snapshot yet" (fresh install);
/// an `Err` means the store exists but could not be read — the sync client
/// treats that the same as a version mismatch and forces a refresh.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<Option<AllowlistSnapshot>, StoreError>;
    async fn save(&self, snapshot: &AllowlistSnapshot) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral setups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<AllowlistSnapshot>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: AllowlistSnapshot) -> Self {
        Self {
            inner: Mutex::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed `save` calls, for idempotence assertions.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<AllowlistSnapshot>, StoreError> {
        Ok(self.inner.lock().expect("store poisoned").clone())
    }

    async fn save(&self, snapshot: &AllowlistSnapshot) -> Result<(), StoreError> {
        *self.inner.lock().expect("store poisoned") = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(version: &str) -> AllowlistSnapshot {
        AllowlistSnapshot {
            version: version.to_string(),
            last_updated: 1,
            domains: vec!["example.org".to_string()],
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&snapshot("v1")).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.version, "v1");
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStore::with_snapshot(snapshot("v1"));
        store.save(&snapshot("v2")).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().version, "v2");
    }
}
