//! Bounded edit-distance matching for near-miss typos
//!
//! Catches `thehotlien.org` for `thehotline.org` without over-matching
//! short, common domains. Every guard here exists to keep the worst case
//! cheap: length gates before any distance work, length-bucket pruning of
//! candidates, and a banded distance computation that aborts as soon as a
//! row can no longer beat the threshold.

use crate::index::DomainIndex;
use crate::normalize::base_domain;
use crate::types::FuzzyMatch;

/// Hosts shorter than this never fuzzy-match; close misses of short domains
/// are overwhelmingly legitimate unrelated sites.
pub const FUZZY_MIN_HOST_LEN: usize = 10;

/// Hosts longer than this never fuzzy-match; hard stop for pathologically
/// long adversarial hostnames.
pub const FUZZY_MAX_HOST_LEN: usize = 256;

/// Maximum edit distance counted as a typo.
pub const FUZZY_THRESHOLD: u32 = 2;

/// Find a protected base domain within [`FUZZY_THRESHOLD`] edits of the
/// host's base domain.
///
/// First qualifying candidate wins, in index order — callers only need a
/// boolean, so there is no value in hunting for the global minimum.
/// Case-sensitive: inputs are normalized to lowercase upstream.
pub fn fuzzy_match(index: &DomainIndex, host: &str) -> Option<FuzzyMatch> {
    if host.len() < FUZZY_MIN_HOST_LEN || host.len() > FUZZY_MAX_HOST_LEN {
        return None;
    }

    let candidate = base_domain(host);
    if candidate.is_empty() {
        return None;
    }

    for base in index.bases_near_len(candidate.len(), FUZZY_THRESHOLD as usize) {
        let distance = bounded_levenshtein(&candidate, base, FUZZY_THRESHOLD);
        if distance > 0 && distance <= FUZZY_THRESHOLD {
            return Some(FuzzyMatch {
                domain: base.to_string(),
                distance,
            });
        }
    }

    None
}

/// Levenshtein distance (unit-cost insert/delete/substitute), capped at
/// `max`. Returns `max + 1` as soon as the distance provably exceeds `max`,
/// so cost stays bounded regardless of input length.
pub fn bounded_levenshtein(a: &str, b: &str, max: u32) -> u32 {
    let a = a.as_bytes();
    let b = b.as_bytes();

    if a == b {
        return 0;
    }
    if a.len().abs_diff(b.len()) as u32 > max {
        return max + 1;
    }

    let m = b.len();
    let mut prev: Vec<u32> = (0..=m as u32).collect();
    let mut curr: Vec<u32> = vec![0; m + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i as u32 + 1;
        let mut row_min = curr[0];

        for j in 1..=m {
            let substitute = prev[j - 1] + u32::from(ca != b[j - 1]);
            let delete = prev[j] + 1;
            let insert = curr[j - 1] + 1;
            curr[j] = substitute.min(delete).min(insert);
            row_min = row_min.min(curr[j]);
        }

        // Distances are non-decreasing along the DP; once a whole row
        // exceeds the cap there is no way back under it.
        if row_min > max {
            return max + 1;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m].min(max + 1)
}
