//! Cache-wrapped access to every source.
//!
//! [`DataHub`] is what the report layer talks to. Each operation is total:
//! a failing source is logged and replaced by the empty value of its kind,
//! and that empty value is cached for the kind's TTL like any other result,
//! so one broken site is asked again only once per TTL window.

use crate::cache::{Clock, ExpiringCache, SystemClock};
use crate::config::{CacheSettings, Company, Period};
use crate::extractor::extract_news;
use crate::models::{NewsRecord, QuoteSnapshot};
use crate::sources::{FeedSource, PageSource, QuoteSource};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Identity of a cached news fetch: which fetcher, with which argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NewsKey {
    Feed(String),
    IrPage(String),
}

pub struct DataHub<Q, F, P, C = SystemClock> {
    quotes: Q,
    feeds: F,
    pages: P,
    quote_cache: ExpiringCache<(String, Period), QuoteSnapshot, C>,
    news_cache: ExpiringCache<NewsKey, Vec<NewsRecord>, C>,
    settings: CacheSettings,
}

impl<Q, F, P> DataHub<Q, F, P, SystemClock>
where
    Q: QuoteSource,
    F: FeedSource,
    P: PageSource,
{
    pub fn new(quotes: Q, feeds: F, pages: P, settings: CacheSettings) -> Self {
        Self::with_clock(quotes, feeds, pages, settings, SystemClock)
    }
}

impl<Q, F, P, C> DataHub<Q, F, P, C>
where
    Q: QuoteSource,
    F: FeedSource,
    P: PageSource,
    C: Clock + Clone,
{
    pub fn with_clock(quotes: Q, feeds: F, pages: P, settings: CacheSettings, clock: C) -> Self {
        Self {
            quotes,
            feeds,
            pages,
            quote_cache: ExpiringCache::with_clock(clock.clone()),
            news_cache: ExpiringCache::with_clock(clock),
            settings,
        }
    }

    /// Price history and info for a listed company.
    ///
    /// # Arguments
    ///
    /// * `company` - The company; its `ticker` is the cache key together with `period`
    /// * `period` - The history window
    ///
    /// # Returns
    ///
    /// The cached or freshly fetched snapshot. Companies without a ticker get
    /// an empty snapshot and cause no network call; a failed fetch yields an
    /// empty snapshot that is cached for the quote TTL.
    #[instrument(level = "info", skip_all, fields(company = %company.short))]
    pub async fn get_quotes_for(&self, company: &Company, period: Period) -> Arc<QuoteSnapshot> {
        let Some(ticker) = company.ticker.as_deref() else {
            return Arc::new(QuoteSnapshot::default());
        };
        let key = (ticker.to_string(), period);
        self.quote_cache
            .get_or_compute(key, self.settings.quote_ttl, || async {
                match self.quotes.history(ticker, period).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(%ticker, kind = e.kind(), error = %e, "quote source failed; caching empty history");
                        QuoteSnapshot::default()
                    }
                }
            })
            .await
    }

    /// News search feed results for the company's query.
    #[instrument(level = "info", skip_all, fields(company = %company.short))]
    pub async fn get_feed_for(&self, company: &Company) -> Arc<Vec<NewsRecord>> {
        let query = company.news_query.as_str();
        self.news_cache
            .get_or_compute(NewsKey::Feed(query.to_string()), self.settings.news_ttl, || async {
                match self.feeds.search(query).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!(%query, kind = e.kind(), error = %e, "feed source failed; caching empty result");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Items extracted from the company's IR/news page.
    ///
    /// # Arguments
    ///
    /// * `company` - The company whose `ir_url` is fetched and keyed on
    ///
    /// # Returns
    ///
    /// At most 20 records from the first recognized listing. An empty list
    /// means the page failed to load or matched no layout; either way it is
    /// cached for the news TTL.
    #[instrument(level = "info", skip_all, fields(company = %company.short))]
    pub async fn get_news_for(&self, company: &Company) -> Arc<Vec<NewsRecord>> {
        let url = company.ir_url.as_str();
        self.news_cache
            .get_or_compute(NewsKey::IrPage(url.to_string()), self.settings.news_ttl, || async {
                match self.pages.fetch_page(url).await {
                    Ok(page) => {
                        let records = extract_news(&page.html, &page.base_url);
                        if records.is_empty() {
                            info!(%url, "no recognizable news listing on page");
                        }
                        records
                    }
                    Err(e) => {
                        warn!(%url, kind = e.kind(), error = %e, "page source failed; caching empty result");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Drop every cached entry; the next request of each kind refetches.
    pub fn invalidate_all(&self) {
        self.quote_cache.clear_all();
        self.news_cache.clear_all();
        info!("all cached data invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::ManualClock;
    use crate::config::default_companies;
    use crate::error::FetchError;
    use crate::models::QuoteBar;
    use crate::sources::Page;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    #[derive(Default)]
    struct FakeQuotes {
        calls: AtomicUsize,
        fail: bool,
    }

    impl QuoteSource for FakeQuotes {
        async fn history(&self, _symbol: &str, _period: Period) -> Result<QuoteSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Timeout);
            }
            Ok(QuoteSnapshot {
                bars: vec![QuoteBar {
                    timestamp: 1,
                    open: 1.0,
                    high: 2.0,
                    low: 0.5,
                    close: 1.5,
                    volume: 10,
                }],
                ..QuoteSnapshot::default()
            })
        }
    }

    #[derive(Default)]
    struct FakeFeeds {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FeedSource for FakeFeeds {
        async fn search(&self, query: &str) -> Result<Vec<NewsRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Status(503));
            }
            Ok(vec![NewsRecord::new("2024-03-15", format!("About {query}"), "https://news.example.com/1", "Wire")])
        }
    }

    #[derive(Default)]
    struct FakePages {
        calls: AtomicUsize,
        fail: bool,
        html: &'static str,
    }

    impl PageSource for FakePages {
        async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Network("connection reset".into()));
            }
            Ok(Page {
                html: self.html.to_string(),
                base_url: Url::parse(url)?,
            })
        }
    }

    const IR_PAGE: &str = r#"<ul>
        <li>2024/03/15 <a href="/news/3">Third press release</a></li>
        <li>2024/02/15 <a href="/news/2">Second press release</a></li>
        <li>2024/01/15 <a href="/news/1">First press release</a></li>
    </ul>"#;

    type TestHub = DataHub<FakeQuotes, FakeFeeds, FakePages, Arc<ManualClock>>;

    fn hub(quotes: FakeQuotes, feeds: FakeFeeds, pages: FakePages) -> (TestHub, Arc<ManualClock>) {
        let clock = ManualClock::new();
        let hub = DataHub::with_clock(quotes, feeds, pages, CacheSettings::default(), Arc::clone(&clock));
        (hub, clock)
    }

    fn listed() -> Company {
        default_companies().remove(0)
    }

    fn unlisted() -> Company {
        default_companies().remove(2)
    }

    #[tokio::test]
    async fn test_quotes_cached_within_ttl() {
        let (hub, clock) = hub(FakeQuotes::default(), FakeFeeds::default(), FakePages::default());
        let company = listed();

        let first = hub.get_quotes_for(&company, Period::ThreeMonths).await;
        clock.advance(Duration::from_secs(60));
        let second = hub.get_quotes_for(&company, Period::ThreeMonths).await;

        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.bars.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_quotes_refetched_after_ttl() {
        let (hub, clock) = hub(FakeQuotes::default(), FakeFeeds::default(), FakePages::default());
        let company = listed();

        hub.get_quotes_for(&company, Period::ThreeMonths).await;
        clock.advance(Duration::from_secs(300));
        hub.get_quotes_for(&company, Period::ThreeMonths).await;

        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_periods_are_independent_keys() {
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), FakePages::default());
        let company = listed();

        hub.get_quotes_for(&company, Period::ThreeMonths).await;
        hub.get_quotes_for(&company, Period::OneYear).await;

        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unlisted_company_skips_quote_source() {
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), FakePages::default());

        let snapshot = hub.get_quotes_for(&unlisted(), Period::OneMonth).await;

        assert!(snapshot.is_empty());
        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_quote_source_yields_cached_empty_value() {
        let quotes = FakeQuotes {
            fail: true,
            ..FakeQuotes::default()
        };
        let (hub, clock) = hub(quotes, FakeFeeds::default(), FakePages::default());
        let company = listed();

        let snapshot = hub.get_quotes_for(&company, Period::ThreeMonths).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.info.trailing_pe, None);

        clock.advance(Duration::from_secs(10));
        hub.get_quotes_for(&company, Period::ThreeMonths).await;
        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_feed_and_page_yield_empty() {
        let feeds = FakeFeeds {
            fail: true,
            ..FakeFeeds::default()
        };
        let pages = FakePages {
            fail: true,
            ..FakePages::default()
        };
        let (hub, _clock) = hub(FakeQuotes::default(), feeds, pages);
        let company = listed();

        assert!(hub.get_feed_for(&company).await.is_empty());
        assert!(hub.get_news_for(&company).await.is_empty());
    }

    #[tokio::test]
    async fn test_news_extracted_from_page() {
        let pages = FakePages {
            html: IR_PAGE,
            ..FakePages::default()
        };
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), pages);
        let company = listed();

        let records = hub.get_news_for(&company).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, "2024/03/15");
        assert_eq!(records[0].link, "https://www.pa-consul.co.jp/news/3");
        assert_eq!(records[0].source, "IR");
    }

    #[tokio::test]
    async fn test_unrecognized_page_is_empty_not_error() {
        let pages = FakePages {
            html: "<p><a href='/x'>Just one link</a></p>",
            ..FakePages::default()
        };
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), pages);

        assert!(hub.get_news_for(&listed()).await.is_empty());
    }

    #[tokio::test]
    async fn test_feed_and_page_use_separate_slots() {
        let pages = FakePages {
            html: IR_PAGE,
            ..FakePages::default()
        };
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), pages);
        let company = listed();

        let feed = hub.get_feed_for(&company).await;
        let ir = hub.get_news_for(&company).await;
        hub.get_feed_for(&company).await;
        hub.get_news_for(&company).await;

        assert_eq!(feed[0].source, "Wire");
        assert_eq!(ir[0].source, "IR");
        assert_eq!(hub.feeds.calls.load(Ordering::SeqCst), 1);
        assert_eq!(hub.pages.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refetch() {
        let (hub, _clock) = hub(FakeQuotes::default(), FakeFeeds::default(), FakePages::default());
        let company = listed();

        hub.get_quotes_for(&company, Period::ThreeMonths).await;
        hub.get_feed_for(&company).await;
        hub.invalidate_all();
        hub.get_quotes_for(&company, Period::ThreeMonths).await;
        hub.get_feed_for(&company).await;

        assert_eq!(hub.quotes.calls.load(Ordering::SeqCst), 2);
        assert_eq!(hub.feeds.calls.load(Ordering::SeqCst), 2);
    }
}
