//! Protected domain index
//!
//! An in-memory exact-match set over the protected domains plus generated
//! `www.` aliases. The underlying base domains are additionally bucketed by
//! length so the fuzzy matcher can prune candidates without scanning the
//! whole set.

use std::collections::{BTreeMap, HashSet};

use crate::normalize::base_domain;

/// Immutable exact-match index over the protected set.
///
/// Built once and shared read-only; a sync publishes a replacement index
/// rather than mutating this one.
#[derive(Debug, Default)]
pub struct DomainIndex {
    /// Every protected domain, every alias, and the synthesized `www.`
    /// variant of each.
    entries: HashSet<String>,
    /// Registrable base domains bucketed by length, for fuzzy candidates.
    /// Vec order within a bucket preserves insertion order.
    base_buckets: BTreeMap<usize, Vec<String>>,
    base_count: usize,
}

impl DomainIndex {
    /// Build an index from raw domain strings.
    ///
    /// Entries are trimmed and lowercased; empties are skipped. Every entry
    /// not already `www.`-prefixed also gets a `www.` alias.
    pub fn build<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = DomainIndex::default();
        let mut seen_bases: HashSet<String> = HashSet::new();

        for domain in raw {
            let domain = domain.as_ref().trim().to_lowercase();
            if domain.is_empty() {
                continue;
            }

            if !domain.starts_with("www.") {
                index.entries.insert(format!("www.{domain}"));
            }

            let base = base_domain(&domain);
            if !base.is_empty() && seen_bases.insert(base.clone()) {
                index
                    .base_buckets
                    .entry(base.len())
                    .or_default()
                    .push(base);
                index.base_count += 1;
            }

            index.entries.insert(domain);
        }

        index
    }

    /// O(1) membership check. The host must already be normalized.
    #[inline]
    pub fn exact_match(&self, host: &str) -> bool {
        self.entries.contains(host)
    }

    /// The underlying registrable base domains, in insertion order per
    /// length bucket.
    pub fn base_domains(&self) -> impl Iterator<Item = &str> {
        self.base_buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(String::as_str))
    }

    /// Base domains whose length is within `slack` of `len`. This is the
    /// fuzzy matcher's cheap pre-filter: buckets outside the edit threshold
    /// cannot contain a match.
    pub fn bases_near_len(&self, len: usize, slack: usize) -> impl Iterator<Item = &str> {
        let lo = len.saturating_sub(slack);
        let hi = len.saturating_add(slack);
        self.base_buckets
            .range(lo..=hi)
            .flat_map(|(_, bucket)| bucket.iter().map(String::as_str))
    }

    /// Total entries including generated aliases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of distinct base domains.
    pub fn base_len(&self) -> usize {
        self.base_count
    }
}
