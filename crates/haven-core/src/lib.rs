//! Haven Core Library
//!
//! Decision engine guaranteeing that visits to crisis-support domains are
//! never captured by an activity-monitoring subsystem. Given any navigated
//! URL, [`ProtectionEngine::is_url_protected`] answers whether it belongs to
//! the protected set, resilient to casing tricks, minor typos, and inputs
//! built to exhaust the matcher.
//!
//! # Architecture
//!
//! The hot path is synchronous and read-only over an in-memory index that
//! is published by atomic pointer swap; the engine itself never performs
//! network or storage I/O. Callers must honor the answer — the engine only
//! decides.
//!
//! # Modules
//!
//! - `normalize`: URL string to lowercase hostname
//! - `index`: exact-match set with generated `www.` aliases
//! - `fuzzy`: bounded edit-distance typo matching
//! - `engine`: the protection oracle composing the above
//! - `types`: resource records, snapshots, match events
//! - `defaults`: bundled protected-domain list

pub mod defaults;
pub mod engine;
pub mod fuzzy;
pub mod index;
pub mod normalize;
pub mod types;

// Re-export commonly used types
pub use defaults::BUNDLED_DOMAINS;
pub use engine::{MatchEventSink, NullSink, ProtectionEngine};
pub use fuzzy::{bounded_levenshtein, fuzzy_match, FUZZY_MAX_HOST_LEN, FUZZY_MIN_HOST_LEN, FUZZY_THRESHOLD};
pub use index::DomainIndex;
pub use normalize::{base_domain, normalize_host};
pub use types::{
    flatten_resources, AllowlistSnapshot, FuzzyMatch, FuzzyMatchEvent, ProtectedResource,
};
