//! Markdown rendering of a refresh cycle.
//!
//! The report has three parts: a company overview table, a stock metrics
//! table (unknown values shown as `---`), and one section per company with
//! its feed news and IR items.

use super::compact_time;
use crate::config::Company;
use crate::metrics::StockMetrics;
use crate::models::{CompanyReport, DashboardSnapshot, NewsRecord};
use crate::utils::{PLACEHOLDER, escape_cell, format_grouped, format_ratio, format_signed_pct};
use itertools::Itertools;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// News items listed per section.
const ITEMS_PER_SECTION: usize = 10;

fn table_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("| {} |", cells.into_iter().map(|c| escape_cell(c.as_ref())).join(" | "))
}

fn table_header(columns: &[&str]) -> String {
    format!("{}\n|{}", table_row(columns), "---|".repeat(columns.len()))
}

/// Static company facts, one row per company.
pub fn overview_table(companies: &[Company]) -> String {
    let mut md = table_header(&["Company", "Status", "Code", "Product", "Service", "Target", "Website"]);
    for c in companies {
        md.push('\n');
        md.push_str(&table_row([
            c.name.as_str(),
            c.market.as_str(),
            c.code.as_str(),
            c.product.as_str(),
            c.service.as_str(),
            c.target.as_str(),
            c.web_url.as_str(),
        ]));
    }
    md
}

fn metrics_cells(metrics: Option<&StockMetrics>) -> Vec<String> {
    match metrics {
        Some(m) => vec![
            format_grouped(m.price),
            format_signed_pct(m.change_pct),
            format_signed_pct(m.period_return_pct),
            format_grouped(m.period_high),
            format_grouped(m.period_low),
            format_ratio(m.trailing_pe, 1),
            format_ratio(m.price_to_book, 2),
        ],
        None => vec![PLACEHOLDER.to_string(); 7],
    }
}

/// Price metrics comparison, one row per company.
pub fn metrics_table(reports: &[CompanyReport], period_label: &str) -> String {
    let return_column = format!("Return ({period_label})");
    let mut md = table_header(&[
        "Company",
        "Price (JPY)",
        "Day change",
        &return_column,
        "High (JPY)",
        "Low (JPY)",
        "P/E",
        "P/B",
        "Note",
    ]);
    for report in reports {
        let mut cells = vec![report.short.clone()];
        cells.extend(metrics_cells(report.metrics.as_ref()));
        cells.push(report.market.clone());
        md.push('\n');
        md.push_str(&table_row(&cells));
    }
    md
}

fn news_item(record: &NewsRecord) -> String {
    let title = if record.link.is_empty() {
        record.title.clone()
    } else {
        format!("[{}]({})", record.title.replace(']', "\\]"), record.link)
    };
    let meta = [record.date.as_str(), record.source.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .join(" | ");
    if meta.is_empty() {
        format!("- {title}")
    } else {
        format!("- {title}  \n  _{meta}_")
    }
}

fn news_list(md: &mut String, records: &[NewsRecord], empty_notice: &str) {
    if records.is_empty() {
        md.push_str(empty_notice);
        md.push_str("\n\n");
        return;
    }
    for record in records.iter().take(ITEMS_PER_SECTION) {
        md.push_str(&news_item(record));
        md.push('\n');
    }
    md.push('\n');
}

fn company_section(report: &CompanyReport) -> String {
    let mut md = format!("## {} ({})\n\n", report.name, report.market);

    let quote_line = match (&report.ticker, &report.metrics) {
        (Some(_), Some(m)) => format!(
            "Price {} JPY ({:+.0}, {}), volume {}.",
            format_grouped(m.price),
            m.change,
            format_signed_pct(m.change_pct),
            format_grouped(m.volume as f64)
        ),
        (Some(ticker), None) => format!("_Could not fetch quote data for {ticker}._"),
        (None, _) => format!("_{}: no quote data; news and IR only._", report.market),
    };
    md.push_str(&quote_line);
    md.push_str("\n\n### News\n\n");
    news_list(&mut md, &report.feed_news, "_No news found._");

    md.push_str("### IR / News\n\n");
    let ir_notice = format!(
        "_Could not extract items automatically._ [Open the official page]({})",
        report.ir_url
    );
    news_list(&mut md, &report.ir_news, &ir_notice);
    md
}

/// Render the whole report.
pub fn snapshot_to_markdown(snapshot: &DashboardSnapshot, companies: &[Company]) -> String {
    let mut md = format!(
        "# HR-Tech comparison\n\nUpdated {} {} | Companies: {}\n\n",
        snapshot.local_date,
        snapshot.local_time,
        snapshot.companies.iter().map(|c| c.short.as_str()).join(" / ")
    );
    md.push_str(&format!("## Company overview\n\n{}\n\n", overview_table(companies)));
    md.push_str(&format!(
        "## Stock metrics\n\n{}\n\n",
        metrics_table(&snapshot.companies, &snapshot.period)
    ));

    for report in &snapshot.companies {
        md.push_str(&company_section(report));
    }

    md.push_str("---\n\nData: Yahoo Finance, Google News RSS, company IR/news pages. For information only.\n");
    md
}

/// Write the report to `{dir}/{date}_{HHMMSS}.md` and `{dir}/latest.md`.
///
/// # Arguments
///
/// * `snapshot` - The refresh to render
/// * `companies` - Company definitions for the overview table
/// * `markdown_output_dir` - Base directory for Markdown output
///
/// # Returns
///
/// The path of the dated report.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir))]
pub async fn write_report(
    snapshot: &DashboardSnapshot,
    companies: &[Company],
    markdown_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let md = snapshot_to_markdown(snapshot, companies);
    fs::create_dir_all(markdown_output_dir).await?;

    let dir = PathBuf::from(markdown_output_dir);
    let path = dir.join(format!(
        "{}_{}.md",
        snapshot.local_date,
        compact_time(&snapshot.local_time)
    ));
    fs::write(&path, &md).await?;
    fs::write(dir.join("latest.md"), &md).await?;

    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
