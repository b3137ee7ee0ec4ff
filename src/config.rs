//! Tracked companies, quote periods and cache settings.
//!
//! The built-in company set covers four Japanese HR-tech vendors; a YAML
//! file with the same shape can replace it:
//!
//! ```yaml
//! - name: SmartHR
//!   short: SmartHR
//!   ticker: null
//!   code: 非上場
//!   market: 非上場
//!   product: SmartHR
//!   service: クラウド人事・労務管理
//!   target: スタートアップ〜大企業
//!   news_query: SmartHR スマートHR
//!   ir_url: https://smarthr.co.jp/news/
//!   web_url: https://smarthr.co.jp/
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// A tracked company. Unlisted or delisted companies have no `ticker`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Company {
    pub name: String,
    pub short: String,
    #[serde(default)]
    pub ticker: Option<String>,
    pub code: String,
    pub market: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub target: String,
    pub news_query: String,
    pub ir_url: String,
    #[serde(default)]
    pub web_url: String,
}

impl Company {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        short: &str,
        ticker: Option<&str>,
        code: &str,
        market: &str,
        product: &str,
        service: &str,
        target: &str,
        news_query: &str,
        ir_url: &str,
        web_url: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            short: short.to_string(),
            ticker: ticker.map(str::to_string),
            code: code.to_string(),
            market: market.to_string(),
            product: product.to_string(),
            service: service.to_string(),
            target: target.to_string(),
            news_query: news_query.to_string(),
            ir_url: ir_url.to_string(),
            web_url: web_url.to_string(),
        }
    }
}

/// The default comparison set.
pub fn default_companies() -> Vec<Company> {
    vec![
        Company::builtin(
            "プラスアルファ・コンサルティング",
            "プラスアルファ",
            Some("4071.T"),
            "4071",
            "東証プライム",
            "タレントパレット",
            "タレントマネジメント・HR データ分析",
            "中堅〜大企業",
            "プラスアルファ コンサルティング 4071",
            "https://www.pa-consul.co.jp/ir/news/",
            "https://www.pa-consul.co.jp/",
        ),
        Company::builtin(
            "カオナビ",
            "カオナビ",
            None,
            "4435（上場廃止）",
            "上場廃止",
            "カオナビ",
            "クラウド人材管理・組織図・人事データ活用",
            "中堅〜大企業",
            "カオナビ 人事 HR",
            "https://corp.kaonavi.jp/news/",
            "https://kaonavi.jp/",
        ),
        Company::builtin(
            "SmartHR",
            "SmartHR",
            None,
            "非上場",
            "非上場",
            "SmartHR",
            "クラウド人事・労務管理・タレントマネジメント",
            "スタートアップ〜大企業",
            "SmartHR スマートHR",
            "https://smarthr.co.jp/news/",
            "https://smarthr.co.jp/",
        ),
        Company::builtin(
            "HRブレイン",
            "HRブレイン",
            None,
            "非上場",
            "非上場",
            "HRBrain",
            "タレントマネジメント・人事評価・エンゲージメント",
            "中堅〜大企業",
            "HRブレイン HRBrain 人事",
            "https://hrbrain.jp/news/",
            "https://hrbrain.jp/",
        ),
    ]
}

/// Load companies from a YAML file, or the built-in set when `path` is
/// `None`.
#[instrument(level = "info")]
pub async fn load_companies(path: Option<&str>) -> Result<Vec<Company>, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(default_companies());
    };
    let raw = fs::read_to_string(path).await?;
    let companies = parse_companies(&raw)?;
    info!(count = companies.len(), %path, "Loaded company definitions");
    Ok(companies)
}

pub fn parse_companies(raw: &str) -> Result<Vec<Company>, Box<dyn Error>> {
    let companies: Vec<Company> = serde_yaml::from_str(raw)?;
    if companies.is_empty() {
        return Err("company file defines no companies".into());
    }
    Ok(companies)
}

const THREE_YEARS_SECS: i64 = 3 * 365 * 24 * 60 * 60;

/// Quote history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
pub enum Period {
    #[value(name = "1w")]
    OneWeek,
    #[value(name = "1mo")]
    OneMonth,
    #[value(name = "3mo")]
    ThreeMonths,
    #[value(name = "6mo")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "3y")]
    ThreeYears,
    #[value(name = "5y")]
    FiveYears,
}

impl Period {
    /// Range parameter understood by the quote provider, which has no
    /// 3-year range.
    pub fn range(self) -> Option<&'static str> {
        match self {
            Period::OneWeek => Some("5d"),
            Period::OneMonth => Some("1mo"),
            Period::ThreeMonths => Some("3mo"),
            Period::SixMonths => Some("6mo"),
            Period::OneYear => Some("1y"),
            Period::ThreeYears => None,
            Period::FiveYears => Some("5y"),
        }
    }

    /// Chart query parameters for this window.
    ///
    /// # Arguments
    ///
    /// * `now` - Unix timestamp (seconds) the window ends at
    ///
    /// # Returns
    ///
    /// `range=<r>` when the provider has a named range, otherwise an explicit
    /// `period1=<start>&period2=<now>` span.
    pub fn chart_query(self, now: i64) -> String {
        match self.range() {
            Some(range) => format!("range={range}"),
            None => format!("period1={}&period2={now}", now - THREE_YEARS_SECS),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::OneWeek => "1 week",
            Period::OneMonth => "1 month",
            Period::ThreeMonths => "3 months",
            Period::SixMonths => "6 months",
            Period::OneYear => "1 year",
            Period::ThreeYears => "3 years",
            Period::FiveYears => "5 years",
        }
    }
}

/// Per-kind TTLs and the network timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub quote_ttl: Duration,
    pub news_ttl: Duration,
    pub request_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            quote_ttl: Duration::from_secs(5 * 60),
            news_ttl: Duration::from_secs(10 * 60),
            request_timeout: Duration::from_secs(15),
        }
    }
}
