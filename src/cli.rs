//! Command-line interface definitions for HR-Tech Compare.
//!
//! Every option can be given as a flag; the company file can also come from
//! the environment.

use crate::config::{CacheSettings, Period};
use clap::Parser;
use std::time::Duration;

/// Command-line arguments for the HR-Tech Compare application.
///
/// # Examples
///
/// ```sh
/// # One refresh with the built-in companies
/// hrtech_compare -j ./json -m ./markdown
///
/// # Refresh every 5 minutes over a one-year window
/// hrtech_compare -j ./json -m ./markdown -p 1y --refresh-minutes 5
///
/// # Custom company set
/// hrtech_compare -j ./json -m ./markdown -c companies.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON snapshots
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for the Markdown reports
    #[arg(short, long)]
    pub markdown_output_dir: String,

    /// Optional YAML file replacing the built-in company set
    #[arg(short, long, env = "HRTECH_COMPANIES")]
    pub companies: Option<String>,

    /// Quote history window
    #[arg(short, long, value_enum, default_value = "3mo")]
    pub period: Period,

    /// Refresh interval in minutes; 0 runs a single refresh and exits
    #[arg(long, default_value_t = 0)]
    pub refresh_minutes: u64,

    /// How long quote results stay fresh, in seconds
    #[arg(long, default_value_t = 300)]
    pub quote_ttl_secs: u64,

    /// How long feed and IR page results stay fresh, in seconds
    #[arg(long, default_value_t = 600)]
    pub news_ttl_secs: u64,

    /// Network timeout per request, in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            quote_ttl: Duration::from_secs(self.quote_ttl_secs),
            news_ttl: Duration::from_secs(self.news_ttl_secs),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// `None` in single-run mode.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_minutes > 0).then(|| Duration::from_secs(self.refresh_minutes * 60))
    }
}
