//! Yahoo Finance daily history.
//!
//! Bars come from the v8 chart endpoint; rows with any missing OHLCV value
//! are dropped. Valuation fields (trailing P/E, price-to-book) come from the
//! v7 quote endpoint on a best-effort basis: when that lookup fails the bars
//! are still returned and the fields stay unknown.

use super::QuoteSource;
use crate::config::Period;
use crate::error::FetchError;
use crate::models::{QuoteBar, QuoteInfo, QuoteSnapshot};
use crate::utils::truncate_for_log;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const QUOTE_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteColumns {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    quote_response: QuoteResult,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    result: Option<Vec<QuoteFields>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteFields {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    price_to_book: Option<f64>,
    currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct YahooQuoteSource {
    client: Client,
}

impl YahooQuoteSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    async fn info(&self, symbol: &str) -> Result<QuoteInfo, FetchError> {
        let url = format!("{}?symbols={}", QUOTE_ENDPOINT, urlencoding::encode(symbol));
        parse_quote_info(&self.get_text(&url).await?)
    }
}

/// Daily-bar chart URL for `symbol` over `period`, ending at `now`.
pub fn chart_url(symbol: &str, period: Period, now: i64) -> String {
    format!(
        "{}/{}?{}&interval=1d",
        CHART_ENDPOINT,
        urlencoding::encode(symbol),
        period.chart_query(now)
    )
}

impl QuoteSource for YahooQuoteSource {
    #[instrument(level = "info", skip(self), fields(period = period.label()))]
    async fn history(&self, symbol: &str, period: Period) -> Result<QuoteSnapshot, FetchError> {
        let url = chart_url(symbol, period, Utc::now().timestamp());
        let body = self.get_text(&url).await?;
        let mut snapshot = parse_chart(&body).inspect_err(|e| {
            debug!(error = %e, preview = %truncate_for_log(&body, 200), "chart body did not parse");
        })?;

        match self.info(symbol).await {
            Ok(info) => {
                snapshot.info.trailing_pe = info.trailing_pe;
                snapshot.info.price_to_book = info.price_to_book;
                if snapshot.info.currency.is_none() {
                    snapshot.info.currency = info.currency;
                }
            }
            Err(e) => debug!(error = %e, "quote info unavailable; valuation fields unknown"),
        }

        debug!(bars = snapshot.bars.len(), "fetched quote history");
        Ok(snapshot)
    }
}

fn value_at<T: Copy>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).copied().flatten()
}

/// Decode a v8 chart response into bars.
fn parse_chart(body: &str) -> Result<QuoteSnapshot, FetchError> {
    let response: ChartResponse = serde_json::from_str(body)?;
    if let Some(error) = response.chart.error {
        return Err(FetchError::Parse(format!("{}: {}", error.code, error.description)));
    }
    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(QuoteSnapshot::default());
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let columns = data.indicators.quote.into_iter().next().unwrap_or_default();
    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            Some(QuoteBar {
                timestamp,
                open: value_at(&columns.open, i)?,
                high: value_at(&columns.high, i)?,
                low: value_at(&columns.low, i)?,
                close: value_at(&columns.close, i)?,
                volume: value_at(&columns.volume, i)?,
            })
        })
        .collect();

    Ok(QuoteSnapshot {
        bars,
        info: QuoteInfo {
            currency: data.meta.and_then(|m| m.currency),
            ..QuoteInfo::default()
        },
    })
}

fn parse_quote_info(body: &str) -> Result<QuoteInfo, FetchError> {
    let response: QuoteResponse = serde_json::from_str(body)?;
    let fields = response
        .quote_response
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FetchError::Parse("empty quote result".to_string()))?;
    Ok(QuoteInfo {
        trailing_pe: fields.trailing_pe,
        price_to_book: fields.price_to_book,
        currency: fields.currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{"chart":{"result":[{
        "meta":{"currency":"JPY","symbol":"4071.T"},
        "timestamp":[1710460800,1710720000,1710806400],
        "indicators":{"quote":[{
            "open":[2000.0,null,2050.0],
            "high":[2100.0,2080.0,2120.0],
            "low":[1990.0,2010.0,2040.0],
            "close":[2080.0,2030.0,2110.0],
            "volume":[120000,95000,130000]
        }]}
    }],"error":null}}"#;

    #[test]
    fn test_chart_url_ranges() {
        let now = 1_710_806_400;
        assert_eq!(
            chart_url("4071.T", Period::ThreeMonths, now),
            "https://query1.finance.yahoo.com/v8/finance/chart/4071.T?range=3mo&interval=1d"
        );
        let three_years = chart_url("4071.T", Period::ThreeYears, now);
        assert!(three_years.contains(&format!("period1={}&period2={now}", now - 94_608_000)));
        assert!(!three_years.contains("range="));
    }

    #[test]
    fn test_parse_chart_skips_incomplete_rows() {
        let snapshot = parse_chart(CHART).unwrap();
        assert_eq!(snapshot.bars.len(), 2);
        assert_eq!(snapshot.bars[0].timestamp, 1710460800);
        assert_eq!(snapshot.bars[1].close, 2110.0);
        assert_eq!(snapshot.bars[1].volume, 130000);
        assert_eq!(snapshot.info.currency.as_deref(), Some("JPY"));
        assert_eq!(snapshot.info.trailing_pe, None);
    }

    #[test]
    fn test_parse_chart_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_parse_chart_without_timestamps() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let snapshot = parse_chart(body).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_quote_info() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"4071.T","trailingPE":18.4,"currency":"JPY"}],"error":null}}"#;
        let info = parse_quote_info(body).unwrap();
        assert_eq!(info.trailing_pe, Some(18.4));
        assert_eq!(info.price_to_book, None);
    }

    #[test]
    fn test_parse_quote_info_empty() {
        let body = r#"{"quoteResponse":{"result":[],"error":null}}"#;
        assert!(parse_quote_info(body).is_err());
    }
}
