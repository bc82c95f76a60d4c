//! File-backed snapshot store
//!
//! Persists the allowlist snapshot as pretty-printed JSON at a caller-chosen
//! path. Writes go through a sibling temp file and a rename so a crash
//! mid-write never leaves a half-written snapshot behind.

use std::path::PathBuf;

use async_trait::async_trait;

use haven_core::AllowlistSnapshot;
use haven_sync::{SnapshotStore, StoreError};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn load(&self) -> Result<Option<AllowlistSnapshot>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StoreError::Read {
                    message: self.path.display().to_string(),
                    source: Some(Box::new(err)),
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    async fn save(&self, snapshot: &AllowlistSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(snapshot).map_err(|err| StoreError::Write {
            message: "serialize snapshot".to_string(),
            source: Some(Box::new(err)),
        })?;

        let tmp = self.path.with_extension("tmp");
        let write_err = |err: std::io::Error| StoreError::Write {
            message: self.path.display().to_string(),
            source: Some(Box::new(err)),
        };

        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}
