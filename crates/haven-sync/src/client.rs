//! Allowlist sync client
//!
//! Periodically refreshes the protected set from the allowlist endpoint
//! without ever weakening protection: bundled defaults are unioned into
//! every rebuilt index, and any failure leaves the live index untouched.
//! The scheduler lives outside this crate; it just calls
//! [`SyncClient::sync_from_server`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::IF_NONE_MATCH;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use haven_core::types::epoch_millis;
use haven_core::{
    flatten_resources, AllowlistSnapshot, DomainIndex, ProtectedResource, ProtectionEngine,
    BUNDLED_DOMAINS,
};

use crate::store::{SnapshotStore, StoreError};

/// Default request timeout; an expired request counts as a failed sync.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Wire Protocol
// =============================================================================

/// Success body of `GET <allowlist-endpoint>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistResponse {
    pub version: String,
    /// ISO-8601 server timestamp; informational only, the persisted
    /// snapshot records its own refresh time.
    #[serde(default)]
    pub last_updated: String,
    pub resources: Vec<ProtectedResource>,
}

// =============================================================================
// Errors & Outcome
// =============================================================================

#[derive(Debug, Error)]
pub enum SyncError {
    /// Network failure or timeout
    #[error("allowlist request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx, non-304 response
    #[error("allowlist endpoint returned {0}")]
    Status(StatusCode),

    /// A 200 with no resources is treated as a failed sync, never as an
    /// instruction to drop protection
    #[error("allowlist response contained no resources")]
    EmptyResourceList,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new version was installed and persisted
    Changed,
    /// Remote state matches the cached version
    Unchanged,
}

// =============================================================================
// Sync Client
// =============================================================================

/// The sole writer of the protection index.
pub struct SyncClient {
    http: reqwest::Client,
    endpoint: String,
    engine: Arc<ProtectionEngine>,
    store: Arc<dyn SnapshotStore>,
    /// Epoch ms of the last successful contact (200 or 304); 0 = never.
    last_refreshed: AtomicU64,
}

impl SyncClient {
    pub fn new(
        endpoint: impl Into<String>,
        engine: Arc<ProtectionEngine>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self, SyncError> {
        Self::with_timeout(endpoint, engine, store, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        engine: Arc<ProtectionEngine>,
        store: Arc<dyn SnapshotStore>,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            engine,
            store,
            last_refreshed: AtomicU64::new(0),
        })
    }

    /// Seed the engine from the persisted snapshot, if one exists. Called
    /// once at startup so a previous sync survives a cold start without any
    /// network dependency. The bundled defaults are unioned in regardless.
    pub async fn bootstrap(&self) -> bool {
        match self.store.load().await {
            Ok(Some(snapshot)) => {
                let domains = merge_with_defaults(snapshot.domains);
                self.engine.install_index(Arc::new(DomainIndex::build(&domains)));
                log::info!(
                    "bootstrapped index from snapshot {} ({} domains)",
                    snapshot.version,
                    domains.len()
                );
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::warn!("cached snapshot unreadable, keeping bundled defaults: {err}");
                false
            }
        }
    }

    /// One sync pass. Failures are returned; the caller-facing boolean
    /// façade is [`sync_from_server`](Self::sync_from_server).
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        // An unreadable snapshot is "different from any server version":
        // send no validator and let any 200 install.
        let cached_version = match self.store.load().await {
            Ok(Some(snapshot)) => Some(snapshot.version),
            Ok(None) => None,
            Err(err) => {
                log::warn!("cached snapshot unreadable, forcing refresh: {err}");
                None
            }
        };

        let mut request = self.http.get(&self.endpoint);
        if let Some(version) = &cached_version {
            request = request.header(IF_NONE_MATCH, format!("\"{version}\""));
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            self.touch();
            return Ok(SyncOutcome::Unchanged);
        }
        if !response.status().is_success() {
            return Err(SyncError::Status(response.status()));
        }

        let body: AllowlistResponse = response.json().await?;
        if body.resources.is_empty() {
            return Err(SyncError::EmptyResourceList);
        }

        // Simple inequality; servers that ignore the validator and resend
        // the cached version land here.
        if cached_version.as_deref() == Some(body.version.as_str()) {
            self.touch();
            return Ok(SyncOutcome::Unchanged);
        }

        let domains = merge_with_defaults(flatten_resources(&body.resources));
        let snapshot = AllowlistSnapshot {
            version: body.version,
            last_updated: epoch_millis(),
            domains: domains.clone(),
        };

        // Persist first: if the write fails the old index stays live and
        // the next pass retries from the old version.
        self.store.save(&snapshot).await?;
        self.engine.install_index(Arc::new(DomainIndex::build(&domains)));
        self.touch();

        log::info!(
            "allowlist updated to {} ({} domains)",
            snapshot.version,
            snapshot.domains.len()
        );
        Ok(SyncOutcome::Changed)
    }

    /// Scheduler entry point: returns whether the index changed. Every
    /// failure degrades to `false` and is logged, never propagated.
    pub async fn sync_from_server(&self) -> bool {
        match self.sync().await {
            Ok(SyncOutcome::Changed) => true,
            Ok(SyncOutcome::Unchanged) => false,
            Err(err) => {
                log::warn!("allowlist sync failed, keeping current index: {err}");
                false
            }
        }
    }

    /// Epoch ms of the last successful server contact, 0 if none yet.
    pub fn last_refreshed(&self) -> u64 {
        self.last_refreshed.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.last_refreshed.store(epoch_millis(), Ordering::Relaxed);
    }
}

/// Union a synced domain list with the bundled defaults and dedupe.
/// Defaults come first so they lead the fuzzy candidate order; a sync can
/// only ever add domains, never remove one.
pub fn merge_with_defaults(synced: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::with_capacity(BUNDLED_DOMAINS.len() + synced.len());

    for domain in BUNDLED_DOMAINS
        .iter()
        .map(|d| d.to_string())
        .chain(synced.into_iter().map(|d| d.trim().to_lowercase()))
    {
        if !domain.is_empty() && seen.insert(domain.clone()) {
            merged.push(domain);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_and_dedupes() {
        let merged = merge_with_defaults(vec![
            "extra.org".to_string(),
            "THEHOTLINE.ORG".to_string(),
            "extra.org".to_string(),
            "  ".to_string(),
        ]);

        for d in BUNDLED_DOMAINS {
            assert!(merged.iter().any(|m| m == d), "default lost: {d}");
        }
        assert_eq!(merged.iter().filter(|m| *m == "extra.org").count(), 1);
        assert_eq!(
            merged.iter().filter(|m| *m == "thehotline.org").count(),
            1
        );
        assert_eq!(merged.len(), BUNDLED_DOMAINS.len() + 1);
    }

    #[test]
    fn test_merge_defaults_lead() {
        let merged = merge_with_defaults(vec!["zzz.org".to_string()]);
        assert_eq!(merged[0], BUNDLED_DOMAINS[0]);
        assert_eq!(merged.last().map(String::as_str), Some("zzz.org"));
    }

    #[test]
    fn test_response_wire_format() {
        let json = r#"{
            "version": "2024-05-01",
            "lastUpdated": "2024-05-01T12:00:00Z",
            "resources": [{
                "id": "hotline",
                "domain": "thehotline.org",
                "pattern": null,
                "category": "domestic_violence",
                "name": "National Domestic Violence Hotline",
                "description": "",
                "phone": null,
                "text": null,
                "aliases": [],
                "regional": false
            }]
        }"#;
        let body: AllowlistResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.version, "2024-05-01");
        assert_eq!(body.resources.len(), 1);
    }
}
