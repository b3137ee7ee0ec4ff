//! Summary figures for the comparison tables.

use crate::models::QuoteSnapshot;
use serde::{Deserialize, Serialize};

/// Headline numbers for one company over the selected period.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockMetrics {
    /// Latest close.
    pub price: f64,
    /// Latest volume.
    pub volume: u64,
    /// Latest close minus the previous close.
    pub change: f64,
    /// `change` relative to the previous close, in percent.
    pub change_pct: f64,
    /// Last close relative to the first close of the period, in percent.
    pub period_return_pct: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
}

impl StockMetrics {
    /// `None` when the snapshot has no bars.
    pub fn from_snapshot(snapshot: &QuoteSnapshot) -> Option<Self> {
        let bars = &snapshot.bars;
        let first = bars.first()?;
        let latest = bars.last()?;
        // single-bar histories compare against themselves
        let previous = bars.len().checked_sub(2).map_or(latest, |i| &bars[i]);

        let change = latest.close - previous.close;
        let change_pct = percent_of(change, previous.close);
        let period_return_pct = percent_of(latest.close - first.close, first.close);

        let period_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let period_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);

        Some(Self {
            price: latest.close,
            volume: latest.volume,
            change,
            change_pct,
            period_return_pct,
            period_high,
            period_low,
            trailing_pe: snapshot.info.trailing_pe,
            price_to_book: snapshot.info.price_to_book,
        })
    }
}

fn percent_of(delta: f64, base: f64) -> f64 {
    if base == 0.0 { 0.0 } else { delta / base * 100.0 }
}
