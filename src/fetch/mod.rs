// src/fetch/mod.rs
// =============================================================================
// This module loads pages and finds the links in them.
//
// Submodules:
// - http: fetches a page and classifies the outcome
// - html: extracts links from an HTML page
// =============================================================================

mod html;
mod http;

pub use html::extract_links;
pub use http::{FetchedPage, HttpFetcher, PageFetcher, PageStatus};
