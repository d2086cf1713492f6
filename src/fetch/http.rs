// src/fetch/http.rs
// =============================================================================
// This module fetches pages for the crawl loop.
//
// Key functionality:
// - Makes an HTTP GET request for each page the spider visits
// - Sends our user-agent (the same one robots.txt is checked against)
// - Classifies the outcome (OK, redirect, 404, timeout, SSL error, ...)
// - Keeps the HTML body so links can be extracted from it
//
// The crawl loop only talks to the PageFetcher trait. HttpFetcher is the real
// implementation, tests plug in an in-memory site instead.
//
// Rust concepts:
// - async_trait: lets a trait have async methods and still be used as
//   Arc<dyn PageFetcher>
// - Enums: To represent the different page states
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::Result;

const MAX_REDIRECTS: usize = 5;

// The state of a page after fetching it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "target", rename_all = "snake_case")]
pub enum PageStatus {
    /// Page loaded (2xx)
    Ok,
    /// Page redirects elsewhere (3xx), holds the Location target
    Redirect(String),
    /// Page does not exist (404, 410)
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Redirect loop or chain longer than we follow
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error, including other HTTP status codes
    Error,
}

impl PageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, PageStatus::Ok | PageStatus::Redirect(_))
    }
}

// The result of fetching a single page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: Url,
    /// Where the page ended up after redirects, relative links resolve here
    pub final_url: Url,
    pub status: PageStatus,
    pub message: Option<String>,
    /// HTML body, only present for successful text/html responses
    pub body: Option<String>,
}

impl FetchedPage {
    pub fn new(url: Url, status: PageStatus) -> Self {
        Self {
            final_url: url.clone(),
            url,
            status,
            message: None,
            body: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_final_url(mut self, final_url: Url) -> Self {
        self.final_url = final_url;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Something that can load a page for the crawl loop.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchedPage;
}

// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }

    // The underlying client, shared with the robots.txt fetch
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchedPage {
        match self.client.get(url.as_str()).send().await {
            Ok(response) => analyze_response(url.clone(), response).await,
            Err(e) => categorize_error(url.clone(), e),
        }
    }
}

// Turns an HTTP response into a FetchedPage
//
// HTTP status codes:
// - 200-299: Success, body kept if it is HTML
// - 300-399: Redirect (only seen once the redirect limit is hit)
// - 404, 410: Broken
// - anything else: Error
async fn analyze_response(url: Url, response: reqwest::Response) -> FetchedPage {
    let status_code = response.status();
    let message = format!("HTTP {}", status_code.as_u16());
    // reqwest has already followed redirects, this is where we landed
    let final_url = response.url().clone();

    if status_code.is_success() {
        let page = FetchedPage::new(url, PageStatus::Ok)
            .with_message(message)
            .with_final_url(final_url);
        if !is_html(&response) {
            return page;
        }
        match response.text().await {
            Ok(body) => page.with_body(body),
            Err(e) => FetchedPage {
                status: PageStatus::Error,
                message: Some(format!("failed to read body: {}", e)),
                ..page
            },
        }
    } else if status_code.is_redirection() {
        let target = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        FetchedPage::new(url, PageStatus::Redirect(target.clone()))
            .with_message(format!("{} -> {}", message, target))
    } else if matches!(status_code, StatusCode::NOT_FOUND | StatusCode::GONE) {
        FetchedPage::new(url, PageStatus::Broken).with_message(message)
    } else {
        FetchedPage::new(url, PageStatus::Error).with_message(message)
    }
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

// Categorizes transport errors from reqwest
fn categorize_error(url: Url, error: reqwest::Error) -> FetchedPage {
    let error_string = error.to_string();

    let (status, message) = if error.is_timeout() {
        (PageStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (PageStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        if error_string.contains("dns") {
            (PageStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (PageStatus::Error, "Connection failed".to_string())
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        (PageStatus::SslError, "SSL certificate error".to_string())
    } else {
        (PageStatus::Error, error_string)
    };

    FetchedPage::new(url, status).with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("link-spider-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_page_status_is_ok() {
        assert!(PageStatus::Ok.is_ok());
        assert!(PageStatus::Redirect("/x".into()).is_ok());
        assert!(!PageStatus::Broken.is_ok());
        assert!(!PageStatus::Timeout.is_ok());
    }

    #[test]
    fn test_page_status_serializes_with_tag() {
        let json = serde_json::to_value(PageStatus::Broken).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "broken" }));
    }

    #[tokio::test]
    async fn test_fetch_html_page_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header_is("user-agent", "link-spider-test"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<a href=\"/a\">a</a>", "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let page = fetcher().fetch(&url).await;

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.body.as_deref(), Some("<a href=\"/a\">a</a>"));
    }

    #[tokio::test]
    async fn test_fetch_non_html_drops_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data.json", server.uri())).unwrap();
        let page = fetcher().fetch(&url).await;

        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_missing_page_is_broken() {
        let server = MockServer::start().await;
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let page = fetcher().fetch(&url).await;

        assert_eq!(page.status, PageStatus::Broken);
        assert_eq!(page.message.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let page = fetcher().fetch(&url).await;

        assert_eq!(page.status, PageStatus::Error);
        assert!(page.body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_records_where_redirect_landed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/dir/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new/dir/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<a href=\"child\">c</a>", "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        let page = fetcher().fetch(&url).await;

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.url, url);
        assert_eq!(page.final_url.path(), "/new/dir/");
        assert!(page.body.is_some());
    }
}
