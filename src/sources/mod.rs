//! External data sources.
//!
//! Three thin collaborators feed the data hub:
//!
//! | Source | Module | Returns |
//! |--------|--------|---------|
//! | Yahoo Finance chart API | [`quotes`] | [`QuoteSnapshot`] |
//! | Google News search RSS | [`rss`] | `Vec<NewsRecord>` |
//! | Raw HTML page (IR / news) | [`page`] | [`Page`] |
//!
//! Each one is a trait so the hub can be exercised with in-memory fakes.
//! Implementations report failures as [`FetchError`]; turning those into
//! empty values is the hub's job.

pub mod page;
pub mod quotes;
pub mod rss;

use crate::config::Period;
use crate::error::FetchError;
use crate::models::{NewsRecord, QuoteSnapshot};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub use page::HttpPageSource;
pub use quotes::YahooQuoteSource;
pub use rss::GoogleNewsSource;

/// Browser-like user agent; several IR sites refuse obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// A fetched HTML document and the URL relative links resolve against.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub base_url: Url,
}

pub trait QuoteSource {
    async fn history(&self, symbol: &str, period: Period) -> Result<QuoteSnapshot, FetchError>;
}

pub trait FeedSource {
    async fn search(&self, query: &str) -> Result<Vec<NewsRecord>, FetchError>;
}

pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError>;
}

/// Shared HTTP client: browser-like headers and a hard request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.9"));

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
