//! Haven Allowlist Sync
//!
//! Background refresh of the protected domain set. Issues a conditional GET
//! against the allowlist endpoint, merges the result with the bundled
//! defaults, persists a versioned snapshot through the injected
//! [`SnapshotStore`], and publishes a rebuilt index to the engine by atomic
//! swap. A failed sync is logged and changes nothing.

pub mod client;
pub mod store;

pub use client::{
    merge_with_defaults, AllowlistResponse, SyncClient, SyncError, SyncOutcome, DEFAULT_TIMEOUT,
};
pub use store::{BoxedError, MemoryStore, SnapshotStore, StoreError};
