//! Protection decision engine
//!
//! This is the hot path: the navigation interceptor calls
//! [`ProtectionEngine::is_url_protected`] before recording anything, so the
//! call must be total, non-blocking, and cheap even for adversarial input.
//!
//! The engine owns the current [`DomainIndex`] behind an [`ArcSwap`]: the
//! sync client is the only writer and publishes a fully built replacement
//! index; readers are lock-free and always see either the old or the new
//! index in full.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::defaults::BUNDLED_DOMAINS;
use crate::fuzzy::fuzzy_match;
use crate::index::DomainIndex;
use crate::normalize::normalize_host;
use crate::types::FuzzyMatchEvent;

// =============================================================================
// Match Event Sink
// =============================================================================

/// Receiver for fuzzy-match events. Posting is fire-and-forget: the sink
/// must not block, and its failures must never surface in the decision.
pub trait MatchEventSink: Send + Sync {
    fn post(&self, event: FuzzyMatchEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl MatchEventSink for NullSink {
    fn post(&self, _event: FuzzyMatchEvent) {}
}

// =============================================================================
// Protection Engine
// =============================================================================

/// The protection oracle. Construct once at startup and pass by reference
/// to every call site; the index is ready before the first query.
pub struct ProtectionEngine {
    index: ArcSwap<DomainIndex>,
    sink: Box<dyn MatchEventSink>,
}

impl Default for ProtectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtectionEngine {
    /// Engine over the bundled defaults, dropping match events.
    pub fn new() -> Self {
        Self::with_sink(Box::new(NullSink))
    }

    /// Engine over the bundled defaults with the given event sink.
    pub fn with_sink(sink: Box<dyn MatchEventSink>) -> Self {
        Self::with_domains(BUNDLED_DOMAINS.iter().copied(), sink)
    }

    /// Engine over an explicit domain list. The bundled defaults are NOT
    /// implied here; callers that want them must include them. Intended for
    /// snapshot bootstrap and tests.
    pub fn with_domains<I, S>(domains: I, sink: Box<dyn MatchEventSink>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = DomainIndex::build(domains);
        if index.is_empty() {
            // Never start unprotected, whatever we were handed.
            index = DomainIndex::build(BUNDLED_DOMAINS.iter().copied());
        }
        Self {
            index: ArcSwap::from_pointee(index),
            sink,
        }
    }

    /// Decide whether a navigated URL belongs to the protected set.
    ///
    /// Total over arbitrary input: malformed URLs, no-authority schemes,
    /// and pathological hostnames all return `false` without panicking.
    pub fn is_url_protected(&self, url: &str) -> bool {
        let host = match normalize_host(url) {
            Some(host) if !host.is_empty() => host,
            _ => return false,
        };

        let index = self.index.load();
        if index.exact_match(&host) {
            return true;
        }

        if let Some(matched) = fuzzy_match(&index, &host) {
            log::debug!(
                "fuzzy protection hit: {host} ~ {} (d={})",
                matched.domain,
                matched.distance
            );
            self.sink.post(FuzzyMatchEvent::new(&host, &matched));
            return true;
        }

        false
    }

    /// Publish a rebuilt index. Sole caller is the sync client; an empty
    /// index is refused so a broken rebuild can never drop protection.
    pub fn install_index(&self, index: Arc<DomainIndex>) {
        if index.is_empty() {
            log::warn!("refusing to install empty domain index");
            return;
        }
        self.index.store(index);
    }

    /// Snapshot handle to the live index, for stats and tests.
    pub fn current_index(&self) -> Arc<DomainIndex> {
        self.index.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<FuzzyMatchEvent>>>);

    impl MatchEventSink for RecordingSink {
        fn post(&self, event: FuzzyMatchEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_bundled_defaults_protected() {
        let engine = ProtectionEngine::new();
        for domain in BUNDLED_DOMAINS {
            assert!(
                engine.is_url_protected(&format!("https://{domain}")),
                "unprotected: {domain}"
            );
            assert!(
                engine.is_url_protected(&format!("https://www.{domain}/path?q=1#frag")),
                "www variant unprotected: {domain}"
            );
        }
    }

    #[test]
    fn test_case_insensitive() {
        let engine = ProtectionEngine::new();
        assert!(engine.is_url_protected("https://TheHotline.ORG"));
        assert!(engine.is_url_protected("HTTPS://WWW.THEHOTLINE.ORG/"));
    }

    #[test]
    fn test_unrelated_not_protected() {
        let engine = ProtectionEngine::new();
        assert!(!engine.is_url_protected("https://example.com"));
        assert!(!engine.is_url_protected("https://news.ycombinator.com/item?id=1"));
    }

    #[test]
    fn test_total_over_garbage() {
        let engine = ProtectionEngine::new();
        for input in [
            "",
            "   ",
            "not a url",
            "about:blank",
            "data:text/html,x",
            "https://",
            "https://....",
            "::::",
            "https://\u{0}\u{fffd}",
        ] {
            assert!(!engine.is_url_protected(input));
        }
    }

    #[test]
    fn test_typo_is_protected_and_logged() {
        let sink = RecordingSink::default();
        let engine = ProtectionEngine::with_sink(Box::new(sink.clone()));

        assert!(engine.is_url_protected("https://thehotlien.org"));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].candidate, "thehotlien.org");
        assert_eq!(events[0].matched_domain, "thehotline.org");
        assert_eq!(events[0].distance, 2);
        assert!(events[0].timestamp > 0);
    }

    #[test]
    fn test_exact_match_posts_no_event() {
        let sink = RecordingSink::default();
        let engine = ProtectionEngine::with_sink(Box::new(sink.clone()));

        assert!(engine.is_url_protected("https://thehotline.org"));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_install_index_swaps_atomically() {
        let engine = ProtectionEngine::new();
        assert!(!engine.is_url_protected("https://newdomain.example.org"));

        let mut domains: Vec<String> =
            BUNDLED_DOMAINS.iter().map(|d| d.to_string()).collect();
        domains.push("newdomain.example.org".to_string());
        engine.install_index(Arc::new(DomainIndex::build(domains)));

        assert!(engine.is_url_protected("https://newdomain.example.org"));
        assert!(engine.is_url_protected("https://thehotline.org"));
    }

    #[test]
    fn test_empty_index_install_refused() {
        let engine = ProtectionEngine::new();
        engine.install_index(Arc::new(DomainIndex::build(Vec::<String>::new())));
        assert!(engine.is_url_protected("https://thehotline.org"));
    }

    #[test]
    fn test_empty_domain_list_falls_back_to_defaults() {
        let engine =
            ProtectionEngine::with_domains(Vec::<String>::new(), Box::new(NullSink));
        assert!(engine.is_url_protected("https://thehotline.org"));
    }

    #[test]
    fn test_exact_match_throughput() {
        let engine = ProtectionEngine::new();
        let start = Instant::now();
        for _ in 0..1000 {
            assert!(engine.is_url_protected("https://www.thehotline.org/help"));
        }
        assert!(
            start.elapsed().as_millis() < 100,
            "1000 exact matches took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_adversarial_hostname_bounded() {
        let engine = ProtectionEngine::new();
        let url = format!("https://{}.org", "a".repeat(10_000));
        let start = Instant::now();
        assert!(!engine.is_url_protected(&url));
        assert!(
            start.elapsed().as_millis() < 100,
            "pathological host took {:?}",
            start.elapsed()
        );
    }
}
