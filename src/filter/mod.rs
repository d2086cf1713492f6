// src/filter/mod.rs
// =============================================================================
// This module holds the eligibility pipeline: the checks a discovered link
// must pass before it is put on the frontier.
//
// Submodules:
// - predicates: the scope, dedup and robots checks and how to combine them
// - robots: robots.txt rules and how to fetch them
//
// The Eligibility type below is the assembled chain. It never touches the
// frontier itself, the crawl loop enqueues whatever it admits.
// =============================================================================

mod predicates;
mod robots;

pub use predicates::{all_of, is_internal, not_seen, should_request_by_robots, UrlPredicate};
pub use robots::{fetch_robots, robots_url, RobotsRules, RobotsTxt};

use std::sync::Arc;
use url::Url;

use crate::crawl::Seener;

/// An ordered chain of predicates combined with logical AND.
///
/// An empty chain admits every URL.
#[derive(Default)]
pub struct Eligibility {
    predicates: Vec<UrlPredicate>,
}

impl Eligibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: UrlPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The chain used for a crawl: scope, then dedup, then robots.
    pub fn standard<S>(
        root: &Url,
        include_subdomains: bool,
        seener: S,
        user_agent: &str,
        rules: Option<Arc<dyn RobotsRules>>,
    ) -> Self
    where
        S: Seener + Send + Sync + 'static,
    {
        Self::new()
            .with(is_internal(root, include_subdomains))
            .with(not_seen(seener))
            .with(should_request_by_robots(user_agent, rules))
    }

    pub fn allows(&self, candidate: &Url) -> bool {
        self.predicates.iter().all(|predicate| predicate(candidate))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Collapses the chain into a single predicate.
    pub fn into_predicate(self) -> UrlPredicate {
        all_of(self.predicates)
    }
}

impl std::fmt::Debug for Eligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eligibility")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Frontier;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_empty_chain_admits_everything() {
        let chain = Eligibility::new();
        assert!(chain.is_empty());
        assert!(chain.allows(&url("http://anything.org/x")));
    }

    #[test]
    fn test_standard_chain() {
        let root = url("http://example.com/");
        let frontier = Arc::new(Frontier::new());
        let rules: Arc<dyn RobotsRules> =
            Arc::new(RobotsTxt::new("User-agent: *\nDisallow: /private/\n"));

        let chain = Eligibility::standard(&root, false, frontier.clone(), "link-spider", Some(rules));
        assert_eq!(chain.len(), 3);

        assert!(chain.allows(&url("http://example.com/page")));
        assert!(!chain.allows(&url("http://other.com/page")));
        assert!(!chain.allows(&url("http://example.com/private/page")));

        frontier.enqueue(url("http://example.com/page"));
        assert!(!chain.allows(&url("http://example.com/page")));

        // Dequeuing does not make it eligible again
        frontier.dequeue();
        assert!(!chain.allows(&url("http://example.com/page")));
    }

    #[test]
    fn test_chain_does_not_touch_frontier() {
        let root = url("http://example.com/");
        let frontier = Arc::new(Frontier::new());
        let chain = Eligibility::standard(&root, true, frontier.clone(), "link-spider", None);

        assert!(chain.allows(&url("http://sub.example.com/")));
        assert_eq!(frontier.seen_len(), 0);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_into_predicate_matches_allows() {
        let root = url("http://example.com/");
        let predicate = Eligibility::new()
            .with(is_internal(&root, false))
            .into_predicate();

        assert!(predicate(&url("http://example.com/a")));
        assert!(!predicate(&url("http://b.example.com/a")));
    }
}
