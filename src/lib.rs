// src/lib.rs
// =============================================================================
// link-spider: the crawl frontier and link filter of a same-site web spider.
//
// Modules:
// - crawl: the frontier (URL stack + seen set) and the worker loop
// - filter: the eligibility pipeline (scope, dedup, robots.txt)
// - fetch: loading pages over HTTP and extracting their links
// - error: setup errors
//
// The binary in main.rs is a small CLI on top of this library.
// =============================================================================

pub mod crawl;
pub mod error;
pub mod fetch;
pub mod filter;

pub use crawl::{CrawlResult, Frontier, Seener, Spider, SpiderConfig};
pub use error::SpiderError;
pub use fetch::{extract_links, FetchedPage, HttpFetcher, PageFetcher, PageStatus};
pub use filter::{
    all_of, fetch_robots, is_internal, not_seen, should_request_by_robots, Eligibility,
    RobotsRules, RobotsTxt, UrlPredicate,
};
