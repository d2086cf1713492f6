// src/crawl/spider.rs
// =============================================================================
// This module runs the crawl: it wires the frontier, the filter pipeline and
// the page fetcher together and drives them with a pool of workers.
//
// How it works:
// 1. Put the root URL on the frontier
// 2. Start N workers, each one looping:
//    - take the next URL off the frontier
//    - fetch it and extract the links from the HTML
//    - run every link through the eligibility pipeline
//    - put the survivors on the frontier
// 3. Stop when the frontier is empty and no worker is still on a page,
//    or when the page limit is reached
//
// The frontier never blocks when it is empty. A worker that finds nothing to
// do checks whether anybody else is still working (and so might add more
// links). If nobody is, the crawl is over. Otherwise it waits a moment and
// tries again.
// =============================================================================

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::Frontier;
use crate::error::{Result, SpiderError};
use crate::fetch::{extract_links, HttpFetcher, PageFetcher, PageStatus};
use crate::filter::{fetch_robots, is_internal, Eligibility, RobotsRules, UrlPredicate};

pub const DEFAULT_USER_AGENT: &str = "link-spider";
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(10);

// Everything a crawl needs to know up front
#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Where the crawl starts, also defines which host is "internal"
    pub root: Url,
    /// Treat *.root-host as internal too
    pub include_subdomains: bool,
    /// Sent with every request and matched against robots.txt
    pub user_agent: String,
    /// Number of concurrent workers
    pub workers: usize,
    /// Stop after this many pages have been fetched
    pub max_pages: Option<usize>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long an idle worker waits before looking for work again
    pub idle_interval: Duration,
}

impl SpiderConfig {
    // Parses and validates the root URL, everything else gets a default
    pub fn new(root: &str) -> Result<Self> {
        let root = Url::parse(root).map_err(|source| SpiderError::InvalidRoot {
            input: root.to_string(),
            source,
        })?;

        if !matches!(root.scheme(), "http" | "https") {
            return Err(SpiderError::UnsupportedScheme(root.scheme().to_string()));
        }
        if root.host_str().is_none() {
            return Err(SpiderError::MissingHost(root.to_string()));
        }

        Ok(Self {
            root,
            include_subdomains: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            workers: DEFAULT_WORKERS,
            max_pages: None,
            timeout: DEFAULT_TIMEOUT,
            idle_interval: DEFAULT_IDLE_INTERVAL,
        })
    }
}

// One line of the crawl report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    #[serde(flatten)]
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Links found on the page
    pub links_found: usize,
    /// Of those, how many were put on the frontier
    pub links_admitted: usize,
}

impl CrawlResult {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

pub struct Spider {
    config: SpiderConfig,
    fetcher: Arc<dyn PageFetcher>,
    // Only set when we own an HTTP client, used to fetch robots.txt
    client: Option<reqwest::Client>,
}

impl Spider {
    // A spider that fetches over HTTP
    pub fn new(config: SpiderConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout)?;
        let client = fetcher.client().clone();
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            client: Some(client),
        })
    }

    // A spider that loads pages through any other fetcher
    pub fn with_fetcher(config: SpiderConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config,
            fetcher,
            client: None,
        }
    }

    /// Fetches robots.txt for the root, then crawls.
    ///
    /// Only the root host's robots.txt is consulted. With
    /// `include_subdomains` its rules are applied to subdomain pages too,
    /// their own robots.txt files are not fetched.
    pub async fn run(&self) -> Vec<CrawlResult> {
        let rules = match &self.client {
            Some(client) => fetch_robots(client, &self.config.root).await,
            None => {
                debug!("no HTTP client configured, crawling without robots.txt");
                None
            }
        };
        self.crawl(rules).await
    }

    /// Crawls the site with the given robots rules (`None` allows everything).
    pub async fn crawl(&self, rules: Option<Arc<dyn RobotsRules>>) -> Vec<CrawlResult> {
        let root = self.config.root.clone();
        let frontier = Arc::new(Frontier::new());
        let eligibility = Eligibility::standard(
            &root,
            self.config.include_subdomains,
            frontier.clone(),
            &self.config.user_agent,
            rules,
        );

        if !eligibility.allows(&root) {
            warn!(url = %root, user_agent = %self.config.user_agent, "root URL is excluded by robots.txt");
            return Vec::new();
        }

        info!(
            url = %root,
            workers = self.config.workers,
            include_subdomains = self.config.include_subdomains,
            "starting crawl"
        );
        frontier.enqueue(root);

        let state = Arc::new(CrawlState {
            scope: is_internal(&self.config.root, self.config.include_subdomains),
            frontier,
            eligibility,
            fetcher: self.fetcher.clone(),
            busy: AtomicUsize::new(0),
            fetched: AtomicUsize::new(0),
            max_pages: self.config.max_pages,
            idle_interval: self.config.idle_interval,
        });

        let workers = (0..self.config.workers.max(1))
            .map(|id| tokio::spawn(worker(id, state.clone())))
            .collect::<Vec<_>>();

        let mut results = Vec::new();
        for joined in join_all(workers).await {
            match joined {
                Ok(pages) => results.extend(pages),
                Err(e) => warn!(error = %e, "crawl worker stopped unexpectedly"),
            }
        }

        info!(
            pages = results.len(),
            seen = state.frontier.seen_len(),
            "crawl finished"
        );
        results
    }
}

// State shared by all workers of one crawl
struct CrawlState {
    frontier: Arc<Frontier>,
    eligibility: Eligibility,
    // Checked against where a redirect landed
    scope: UrlPredicate,
    fetcher: Arc<dyn PageFetcher>,
    // Workers currently holding a URL (or about to take one)
    busy: AtomicUsize,
    // Pages handed out so far, checked against max_pages
    fetched: AtomicUsize,
    max_pages: Option<usize>,
    idle_interval: Duration,
}

impl CrawlState {
    // Reserves one page of the budget, false once it is spent
    fn claim_page(&self) -> bool {
        let claimed = self.fetched.fetch_add(1, Ordering::SeqCst);
        self.max_pages.map_or(true, |max| claimed < max)
    }

    async fn visit(&self, url: Url) -> CrawlResult {
        debug!(%url, pending = self.frontier.pending_len(), "fetching");
        let page = self.fetcher.fetch(&url).await;

        // A redirect off-site is reported but its links are not followed
        let landed_in_scope = (self.scope)(&page.final_url);
        if !landed_in_scope {
            debug!(url = %page.url, landed = %page.final_url, "redirected off-site, ignoring links");
        }

        let links = page
            .body
            .as_deref()
            .filter(|_| landed_in_scope)
            .map(|body| extract_links(body, &page.final_url))
            .unwrap_or_default();

        let mut admitted = 0;
        for link in &links {
            if self.eligibility.allows(link) && self.frontier.enqueue_unseen(link.clone()) {
                debug!(url = %link, "admitted");
                admitted += 1;
            }
        }

        if !page.status.is_ok() {
            warn!(
                url = %page.url,
                status = ?page.status,
                message = page.message.as_deref().unwrap_or(""),
                "page failed"
            );
        }

        CrawlResult {
            url: page.url.to_string(),
            status: page.status,
            message: page.message,
            links_found: links.len(),
            links_admitted: admitted,
        }
    }
}

// Marks a worker as busy until dropped, including when a fetch panics
struct BusyGuard<'a> {
    busy: &'a AtomicUsize,
}

impl<'a> BusyGuard<'a> {
    fn enter(busy: &'a AtomicUsize) -> Self {
        busy.fetch_add(1, Ordering::SeqCst);
        Self { busy }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn worker(id: usize, state: Arc<CrawlState>) -> Vec<CrawlResult> {
    let mut results = Vec::new();

    loop {
        // Announce ourselves before dequeuing so an idle worker never sees
        // "nobody busy" while we hold the last URL
        let guard = BusyGuard::enter(&state.busy);

        let url = match state.frontier.dequeue() {
            Some(url) => url,
            None => {
                drop(guard);
                if state.busy.load(Ordering::SeqCst) == 0 && state.frontier.is_empty() {
                    break;
                }
                tokio::time::sleep(state.idle_interval).await;
                continue;
            }
        };

        if !state.claim_page() {
            debug!(worker = id, "page limit reached");
            break;
        }

        results.push(state.visit(url).await);
        drop(guard);
    }

    debug!(worker = id, pages = results.len(), "worker done");
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SpiderConfig::new("https://example.com/start").unwrap();
        assert_eq!(config.root.as_str(), "https://example.com/start");
        assert!(!config.include_subdomains);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.max_pages, None);
    }

    #[test]
    fn test_config_rejects_bad_roots() {
        assert!(matches!(
            SpiderConfig::new("not a url"),
            Err(SpiderError::InvalidRoot { .. })
        ));
        assert!(matches!(
            SpiderConfig::new("ftp://example.com"),
            Err(SpiderError::UnsupportedScheme(s)) if s == "ftp"
        ));
    }

    #[test]
    fn test_crawl_result_json_shape() {
        let result = CrawlResult {
            url: "http://example.com/".into(),
            status: PageStatus::Broken,
            message: Some("HTTP 404".into()),
            links_found: 0,
            links_admitted: 0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "broken");
        assert_eq!(json["message"], "HTTP 404");
        assert_eq!(json["links_found"], 0);
    }

    #[test]
    fn test_busy_guard_released_on_panic() {
        let busy = AtomicUsize::new(0);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = BusyGuard::enter(&busy);
            assert_eq!(busy.load(Ordering::SeqCst), 1);
            panic!("fetch blew up");
        }));

        assert!(outcome.is_err());
        assert_eq!(busy.load(Ordering::SeqCst), 0);
    }
}
