// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - A LIFO frontier (depth-first crawling) that never hands out a URL twice
// - A pool of workers sharing that frontier
// - Same-site restriction, dedup and robots.txt via the filter pipeline
// - Optional page limit
//
// Rust concepts:
// - Arc: sharing one frontier between many async tasks
// - Atomics: counting busy workers without a lock
// =============================================================================

mod frontier;
mod spider;

pub use frontier::{Frontier, Seener};
pub use spider::{
    CrawlResult, Spider, SpiderConfig, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DEFAULT_WORKERS,
};
