//! # HR-Tech Compare
//!
//! Tracks a small set of HR-tech companies and writes comparison reports:
//! stock metrics for the listed ones, news search results and the items
//! published on each company's IR/news page.
//!
//! ## Usage
//!
//! ```sh
//! hrtech_compare -j ./json -m ./markdown
//! hrtech_compare -j ./json -m ./markdown --refresh-minutes 5
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: quote history, news search feed and raw IR pages
//! 2. **Hub**: every source call goes through a per-kind expiring cache
//! 3. **Extraction**: IR pages are reduced to news records structurally
//! 4. **Output**: a JSON snapshot and a Markdown report per refresh
//!
//! With `--refresh-minutes` the process keeps running, refreshing on the
//! interval; pressing Enter drops all cached data and refreshes at once.

use chrono::Local;
use clap::Parser;
use futures::future::join_all;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod config;
mod error;
mod extractor;
mod hub;
mod metrics;
mod models;
mod outputs;
mod sources;
mod utils;

use cli::Cli;
use config::{Company, Period, load_companies};
use hub::DataHub;
use metrics::StockMetrics;
use models::{CompanyReport, DashboardSnapshot};
use outputs::{json, markdown};
use sources::{GoogleNewsSource, HttpPageSource, YahooQuoteSource, build_client};
use utils::ensure_writable_dir;

type Hub = DataHub<YahooQuoteSource, GoogleNewsSource, HttpPageSource>;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("hrtech_compare starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.markdown_output_dir, period = ?args.period, "Parsed CLI arguments");

    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let companies = load_companies(args.companies.as_deref()).await?;
    info!(count = companies.len(), "Tracking companies");

    let settings = args.cache_settings();
    let client = build_client(settings.request_timeout)?;
    let hub: Hub = DataHub::new(
        YahooQuoteSource::new(client.clone()),
        GoogleNewsSource::new(client.clone()),
        HttpPageSource::new(client),
        settings,
    );

    refresh(&hub, &companies, &args).await;

    let Some(period) = args.refresh_interval() else {
        return Ok(());
    };
    info!(minutes = args.refresh_minutes, "Watching; press Enter to refresh now, Ctrl-C to quit");

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                refresh(&hub, &companies, &args).await;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    info!("Manual refresh requested");
                    hub.invalidate_all();
                    refresh(&hub, &companies, &args).await;
                    ticker.reset();
                }
                Ok(None) => {
                    debug!("stdin closed; manual refresh disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Failed reading stdin; manual refresh disabled");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Gather everything for one company. Sources run concurrently; each one
/// degrades to its empty value on failure.
async fn build_report(hub: &Hub, company: &Company, period: Period) -> CompanyReport {
    let (quotes, feed_news, ir_news) = tokio::join!(
        hub.get_quotes_for(company, period),
        hub.get_feed_for(company),
        hub.get_news_for(company),
    );

    let metrics = StockMetrics::from_snapshot(&quotes);
    if company.ticker.is_some() && metrics.is_none() {
        warn!(company = %company.short, "Listed company has no quote data this cycle");
    }

    CompanyReport {
        name: company.name.clone(),
        short: company.short.clone(),
        code: company.code.clone(),
        market: company.market.clone(),
        ticker: company.ticker.clone(),
        ir_url: company.ir_url.clone(),
        metrics,
        feed_news: Arc::unwrap_or_clone(feed_news),
        ir_news: Arc::unwrap_or_clone(ir_news),
    }
}

/// One refresh cycle: fetch (through the cache), then write both outputs.
/// Output failures are logged and do not end the process.
#[instrument(level = "info", skip_all, fields(period = args.period.label()))]
async fn refresh(hub: &Hub, companies: &[Company], args: &Cli) {
    let start_time = std::time::Instant::now();

    let reports = join_all(
        companies
            .iter()
            .map(|company| build_report(hub, company, args.period)),
    )
    .await;

    let now = Local::now();
    let snapshot = DashboardSnapshot {
        local_date: now.format("%Y-%m-%d").to_string(),
        local_time: now.format("%H:%M:%S").to_string(),
        period: args.period.label().to_string(),
        companies: reports,
    };

    let feed_items: usize = snapshot.companies.iter().map(|c| c.feed_news.len()).sum();
    let ir_items: usize = snapshot.companies.iter().map(|c| c.ir_news.len()).sum();
    info!(
        local_date = %snapshot.local_date,
        local_time = %snapshot.local_time,
        feed_items,
        ir_items,
        "Snapshot assembled"
    );

    if let Err(e) = json::write_snapshot(&snapshot, &args.json_output_dir).await {
        error!(error = %e, "Failed to write JSON snapshot");
    }
    if let Err(e) = markdown::write_report(&snapshot, companies, &args.markdown_output_dir).await {
        error!(error = %e, "Failed to write Markdown report");
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), millis = elapsed.subsec_millis(), "Refresh complete");
}
