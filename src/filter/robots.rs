// src/filter/robots.rs
// =============================================================================
// This module turns a site's robots.txt into something the filter pipeline
// can ask a single question: "may this user-agent fetch this path?"
//
// The actual robots.txt matching (groups, wildcards, allow vs. disallow
// precedence) is done by the `robotstxt` crate, a port of Google's parser.
// We never re-implement any of that here.
//
// Missing rules are not an error:
// - No robots.txt (404) means every path is allowed
// - An unreachable robots.txt is treated the same way
// - A server error (5xx) means the site is not ready, so we fetch nothing
// =============================================================================

use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

// Robots body used when the server answered with an error
const DISALLOW_ALL: &str = "User-agent: *\nDisallow: /\n";

/// A parsed set of robots exclusion rules.
pub trait RobotsRules: Send + Sync {
    /// Returns `true` if `path` may be fetched by `user_agent`.
    fn test_agent(&self, user_agent: &str, path: &str) -> bool;
}

/// Rules backed by the text of a robots.txt file.
#[derive(Debug, Clone)]
pub struct RobotsTxt {
    body: String,
}

impl RobotsTxt {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Rules that refuse every path for every agent.
    pub fn disallow_all() -> Self {
        Self::new(DISALLOW_ALL)
    }

    /// Resolves an HTTP response for robots.txt into a rule set.
    ///
    /// - 2xx: the body is the rule set
    /// - 4xx: no rules (`None`), everything is allowed
    /// - anything else: everything is disallowed
    pub fn from_status_and_body(status: u16, body: impl Into<String>) -> Option<Arc<dyn RobotsRules>> {
        let rules: Arc<dyn RobotsRules> = match status {
            200..=299 => Arc::new(Self::new(body)),
            400..=499 => return None,
            _ => Arc::new(Self::disallow_all()),
        };
        Some(rules)
    }
}

impl RobotsRules for RobotsTxt {
    fn test_agent(&self, user_agent: &str, path: &str) -> bool {
        // The matcher keeps per-query state, so each query gets its own
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.body, user_agent, path)
    }
}

// Where robots.txt lives for the site `root` belongs to
pub fn robots_url(root: &Url) -> Url {
    let mut url = root.clone();
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    url
}

// Fetches and resolves robots.txt for the site `root` belongs to
//
// Never fails: a network problem is logged and treated as "no rules".
pub async fn fetch_robots(client: &Client, root: &Url) -> Option<Arc<dyn RobotsRules>> {
    let robots_url = robots_url(root);

    let response = match client.get(robots_url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %robots_url, error = %e, "could not fetch robots.txt, allowing all paths");
            return None;
        }
    };

    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(url = %robots_url, error = %e, "could not read robots.txt body, allowing all paths");
            return None;
        }
    };

    debug!(url = %robots_url, status, "fetched robots.txt");
    RobotsTxt::from_status_and_body(status, body)
}
