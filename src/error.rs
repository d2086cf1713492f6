// src/error.rs
// =============================================================================
// Errors that can stop a crawl before it starts.
//
// Once a crawl is running nothing in here is used: a page that fails to load
// becomes a PageStatus in the report, and a robots.txt that cannot be fetched
// simply means "no rules". Only setup problems (a bad root URL, an HTTP
// client that cannot be built) are real errors.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpiderError {
    /// The root URL could not be parsed
    #[error("invalid root URL '{input}': {source}")]
    InvalidRoot {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The root URL is not http or https
    #[error("unsupported scheme '{0}', only http and https can be crawled")]
    UnsupportedScheme(String),

    /// The root URL has no host to scope the crawl to
    #[error("root URL has no host: {0}")]
    MissingHost(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SpiderError>;
