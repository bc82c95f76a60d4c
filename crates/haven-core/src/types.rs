//! Shared type definitions for the protection engine
//!
//! The wire-facing records use camelCase field names to match the allowlist
//! server's JSON; everything else is plain Rust.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =============================================================================
// Protected Resource Records
// =============================================================================

/// A crisis-support resource as served by the allowlist endpoint.
///
/// This is the source of truth the domain index is built from: the primary
/// `domain` plus every non-empty alias contribute entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResource {
    pub id: String,
    pub domain: String,
    /// Optional match pattern; informational, the index matches hostnames.
    #[serde(default)]
    pub pattern: Option<String>,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub regional: bool,
}

/// Flatten resources into a raw domain list: every primary domain plus every
/// non-empty alias, lowercased. Duplicates are permitted here; the index
/// build dedupes.
pub fn flatten_resources(resources: &[ProtectedResource]) -> Vec<String> {
    let mut domains = Vec::with_capacity(resources.len() * 2);
    for resource in resources {
        domains.push(resource.domain.trim().to_lowercase());
        for alias in &resource.aliases {
            if !alias.trim().is_empty() {
                domains.push(alias.trim().to_lowercase());
            }
        }
    }
    domains
}

// =============================================================================
// Persisted Snapshot
// =============================================================================

/// The persisted allowlist state: one value in the injected key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistSnapshot {
    /// Remote-issued version identifier, compared by simple inequality.
    pub version: String,
    /// Epoch milliseconds of the last successful refresh.
    pub last_updated: u64,
    /// Flattened, deduped domain list (bundled defaults included).
    pub domains: Vec<String>,
}

// =============================================================================
// Fuzzy Match Results
// =============================================================================

/// A near-miss hit: `candidate` is within `distance` edits of a protected
/// base domain. Only produced for `0 < distance <= threshold`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub domain: String,
    pub distance: u32,
}

/// Privacy-preserving record of a fuzzy hit, queued for later batch upload.
/// Carries hostnames only — never page content or URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyMatchEvent {
    pub candidate: String,
    pub matched_domain: String,
    pub distance: u32,
    /// Epoch milliseconds.
    pub timestamp: u64,
}

impl FuzzyMatchEvent {
    pub fn new(candidate: &str, matched: &FuzzyMatch) -> Self {
        Self {
            candidate: candidate.to_string(),
            matched_domain: matched.domain.clone(),
            distance: matched.distance,
            timestamp: epoch_millis(),
        }
    }
}

/// Current time as epoch milliseconds. Saturates to 0 before the epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(domain: &str, aliases: &[&str]) -> ProtectedResource {
        ProtectedResource {
            id: "r1".to_string(),
            domain: domain.to_string(),
            pattern: None,
            category: "crisis".to_string(),
            name: "Test Resource".to_string(),
            description: String::new(),
            phone: None,
            text: None,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            regional: false,
        }
    }

    #[test]
    fn test_flatten_counts_primaries_plus_nonempty_aliases() {
        let resources = vec![
            resource("Example.ORG", &["Alias.org", "", "  "]),
            resource("second.net", &["a.net", "b.net"]),
        ];
        let flat = flatten_resources(&resources);
        // 2 primaries + 3 non-empty aliases
        assert_eq!(flat.len(), 5);
        assert!(flat.iter().all(|d| *d == d.to_lowercase()));
        assert_eq!(flat[0], "example.org");
        assert_eq!(flat[1], "alias.org");
    }

    #[test]
    fn test_flatten_keeps_duplicates() {
        let resources = vec![
            resource("dup.org", &[]),
            resource("dup.org", &["dup.org"]),
        ];
        assert_eq!(flatten_resources(&resources).len(), 3);
    }

    #[test]
    fn test_resource_wire_format() {
        let json = r#"{
            "id": "hotline",
            "domain": "thehotline.org",
            "pattern": null,
            "category": "domestic_violence",
            "name": "National Domestic Violence Hotline",
            "description": "24/7 support",
            "phone": "1-800-799-7233",
            "text": "START to 88788",
            "aliases": ["ndvh.org"],
            "regional": false
        }"#;
        let r: ProtectedResource = serde_json::from_str(json).unwrap();
        assert_eq!(r.domain, "thehotline.org");
        assert_eq!(r.aliases, vec!["ndvh.org"]);
        assert!(!r.regional);
    }

    #[test]
    fn test_resource_minimal_wire_format() {
        // Optional fields may be absent entirely.
        let json = r#"{"id":"x","domain":"a.org","category":"c","name":"n"}"#;
        let r: ProtectedResource = serde_json::from_str(json).unwrap();
        assert!(r.aliases.is_empty());
        assert!(r.phone.is_none());
    }
}
