//! Data models shared by the sources, the cache and the report writers.
//!
//! - [`NewsRecord`]: one normalized news/IR item, whatever its origin
//! - [`QuoteBar`] / [`QuoteInfo`] / [`QuoteSnapshot`]: daily price history
//!   plus the scalar valuation fields the provider exposes
//! - [`CompanyReport`] / [`DashboardSnapshot`]: everything gathered for one
//!   refresh cycle, serialized to JSON and rendered to Markdown

use crate::metrics::StockMetrics;
use serde::{Deserialize, Serialize};

/// A single news item.
///
/// `title` is never empty. `link` and `date` use `""` for "unknown"; `link`
/// is always absolute when present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    /// Free-text date as found in the source, possibly empty.
    pub date: String,
    /// Display title.
    pub title: String,
    /// Absolute URL of the item, possibly empty.
    pub link: String,
    /// Provenance label ("IR", a feed-supplied publisher name, ...).
    pub source: String,
}

impl NewsRecord {
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            link: link.into(),
            source: source.into(),
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoteBar {
    /// Unix timestamp (seconds) of the bar.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Scalar fields reported next to the price history. Any of them may be
/// missing; consumers render a placeholder instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuoteInfo {
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub currency: Option<String>,
}

/// Price history and info for one symbol over one period.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuoteSnapshot {
    pub bars: Vec<QuoteBar>,
    pub info: QuoteInfo,
}

impl QuoteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Everything collected for one company during a refresh.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyReport {
    pub name: String,
    pub short: String,
    pub code: String,
    pub market: String,
    pub ticker: Option<String>,
    pub ir_url: String,
    /// Metrics derived from the quote history; `None` for unlisted
    /// companies and for listed ones whose history could not be fetched.
    pub metrics: Option<StockMetrics>,
    pub feed_news: Vec<NewsRecord>,
    pub ir_news: Vec<NewsRecord>,
}

/// The output of one refresh cycle.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardSnapshot {
    /// Local date of the refresh in `YYYY-MM-DD` format.
    pub local_date: String,
    /// Local time of the refresh in `HH:MM:SS` format.
    pub local_time: String,
    /// Human label of the quote period (e.g. "3 months").
    pub period: String,
    pub companies: Vec<CompanyReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_record_new() {
        let record = NewsRecord::new("2024/03/15", "決算説明資料を公開しました", "https://example.com/ir/1", "IR");
        assert_eq!(record.date, "2024/03/15");
        assert_eq!(record.link, "https://example.com/ir/1");
        assert_eq!(record.source, "IR");
    }

    #[test]
    fn test_news_record_serialization() {
        let record = NewsRecord::new("", "Quarterly results", "", "Google News");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""date":"""#));
        assert!(json.contains(r#""link":"""#));

        let back: NewsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = QuoteSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.info.trailing_pe, None);
        assert_eq!(snapshot.info.price_to_book, None);
    }

    #[test]
    fn test_dashboard_snapshot_deserialization() {
        let json = r#"{
            "local_date": "2025-05-06",
            "local_time": "08:00:00",
            "period": "3 months",
            "companies": []
        }"#;

        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.local_date, "2025-05-06");
        assert_eq!(snapshot.period, "3 months");
        assert!(snapshot.companies.is_empty());
    }
}
