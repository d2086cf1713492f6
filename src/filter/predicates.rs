// src/filter/predicates.rs
// =============================================================================
// This module decides whether a discovered link should be crawled.
//
// A link is admitted only if all three checks pass:
// 1. Scope:  it is on the site being crawled (optionally incl. subdomains)
// 2. Dedup:  it has never been put on the frontier
// 3. Robots: the site's robots.txt allows our user-agent to fetch it
//
// Each check is a plain boolean function over a URL, built by a small
// constructor that captures whatever the check needs (the root URL, the
// frontier's seen test, the robots rules). The checks never change anything,
// so the order they run in does not affect the answer.
//
// Rust concepts:
// - Closures: functions that capture values from their environment
// - Box<dyn Fn>: a closure stored behind a pointer so different closures
//   can share one type
// - Send + Sync: lets the filters be shared between worker tasks
// =============================================================================

use std::sync::Arc;
use url::Url;

use super::robots::RobotsRules;
use crate::crawl::Seener;

/// A side-effect-free test over a candidate URL.
pub type UrlPredicate = Box<dyn Fn(&Url) -> bool + Send + Sync>;

// Builds the scope check
//
// Parameters:
//   root: the crawl's starting URL, only its host is used
//   include_subdomains: also accept hosts ending in ".<root host>"
//
// Scheme and port never matter. A URL with no host at all is treated as
// same-site.
pub fn is_internal(root: &Url, include_subdomains: bool) -> UrlPredicate {
    let root_host = root.host_str().map(str::to_owned);
    let subdomain_suffix = root_host.as_ref().map(|host| format!(".{}", host));

    Box::new(move |candidate: &Url| {
        let host = match candidate.host_str() {
            Some(host) => host,
            None => return true,
        };

        match (&root_host, &subdomain_suffix) {
            (Some(root_host), _) if host == root_host.as_str() => true,
            (Some(_), Some(suffix)) if include_subdomains => host.ends_with(suffix.as_str()),
            _ => false,
        }
    })
}

// Builds the dedup check: passes URLs the seener has not seen
pub fn not_seen<S>(seener: S) -> UrlPredicate
where
    S: Seener + Send + Sync + 'static,
{
    Box::new(move |candidate: &Url| !seener.seen(candidate))
}

// Builds the robots check
//
// With no rules every URL passes. Otherwise the rule set alone decides,
// looking only at the URL's path.
pub fn should_request_by_robots(
    user_agent: impl Into<String>,
    rules: Option<Arc<dyn RobotsRules>>,
) -> UrlPredicate {
    let user_agent = user_agent.into();

    Box::new(move |candidate: &Url| match &rules {
        None => true,
        Some(rules) => rules.test_agent(&user_agent, candidate.path()),
    })
}

// Combines predicates with logical AND
pub fn all_of(predicates: Vec<UrlPredicate>) -> UrlPredicate {
    Box::new(move |candidate: &Url| predicates.iter().all(|predicate| predicate(candidate)))
}
