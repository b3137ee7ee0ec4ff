//! Google News search feed.
//!
//! The feed schema is stable RSS 2.0, so a small `quick-xml` event loop is
//! enough: each `<item>` becomes a [`NewsRecord`] with the publication date
//! reformatted to `YYYY-MM-DD` and the publisher taken from `<source>`.

use super::FeedSource;
use crate::error::FetchError;
use crate::models::NewsRecord;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, instrument};

pub const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";

/// Label used when an item does not name its publisher.
pub const DEFAULT_FEED_SOURCE: &str = "Google News";

/// Items kept from one feed.
pub const MAX_FEED_ITEMS: usize = 20;

#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    endpoint: String,
}

impl GoogleNewsSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: GOOGLE_NEWS_SEARCH.to_string(),
        }
    }

    /// Japanese-locale search URL for `query`.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&hl=ja&gl=JP&ceid=JP:ja",
            self.endpoint,
            urlencoding::encode(query)
        )
    }
}

impl FeedSource for GoogleNewsSource {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<NewsRecord>, FetchError> {
        let url = self.search_url(query);
        let xml = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let records = parse_feed(&xml, MAX_FEED_ITEMS).inspect_err(|e| {
            debug!(error = %e, preview = %truncate_for_log(&xml, 200), "feed body did not parse");
        })?;
        debug!(count = records.len(), "parsed feed");
        Ok(records)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    PubDate,
    Source,
}

#[derive(Debug, Default)]
struct ItemFields {
    title: String,
    link: String,
    pub_date: String,
    source: String,
}

impl ItemFields {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.pub_date,
            Field::Source => &mut self.source,
        };
        target.push_str(text);
    }

    fn into_record(self) -> Option<NewsRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        let source = match self.source.trim() {
            "" => DEFAULT_FEED_SOURCE,
            s => s,
        };
        Some(NewsRecord::new(
            format_pub_date(&self.pub_date),
            title,
            self.link.trim(),
            source,
        ))
    }
}

/// RFC 2822 `pubDate` → `YYYY-MM-DD` (UTC); `""` when absent or invalid.
pub fn format_pub_date(raw: &str) -> String {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn resolve_entity(name: &str) -> String {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        if let Some(ch) = code.and_then(char::from_u32) {
            return ch.to_string();
        }
    } else if let Some(resolved) = resolve_predefined_entity(name) {
        return resolved.to_string();
    }
    format!("&{name};")
}

/// Parse an RSS 2.0 document into at most `limit` records.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsRecord>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut item: Option<ItemFields> = None;
    let mut field: Option<Field> = None;

    while records.len() < limit {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => item = Some(ItemFields::default()),
                b"title" if item.is_some() => field = Some(Field::Title),
                b"link" if item.is_some() => field = Some(Field::Link),
                b"pubDate" if item.is_some() => field = Some(Field::PubDate),
                b"source" if item.is_some() => field = Some(Field::Source),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"item" => {
                    field = None;
                    if let Some(record) = item.take().and_then(ItemFields::into_record) {
                        records.push(record);
                    }
                }
                b"title" | b"link" | b"pubDate" | b"source" => field = None,
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(fields), Some(f)) = (item.as_mut(), field) {
                    fields.push(f, &String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                if let (Some(fields), Some(f)) = (item.as_mut(), field) {
                    fields.push(f, &String::from_utf8_lossy(&c));
                }
            }
            Event::GeneralRef(r) => {
                if let (Some(fields), Some(f)) = (item.as_mut(), field) {
                    fields.push(f, &resolve_entity(&String::from_utf8_lossy(&r)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>"SmartHR" - Google ニュース</title>
  <link>https://news.google.com/</link>
  <item>
    <title>SmartHR、新機能を発表 &amp; 提携 - 日本経済新聞</title>
    <link>https://news.google.com/rss/articles/abc</link>
    <pubDate>Fri, 15 Mar 2024 06:00:00 GMT</pubDate>
    <source url="https://www.nikkei.com">日本経済新聞</source>
  </item>
  <item>
    <title><![CDATA[HRBrain raises funding]]></title>
    <link>https://news.google.com/rss/articles/def</link>
    <pubDate>not a date</pubDate>
  </item>
  <item>
    <title>   </title>
    <link>https://news.google.com/rss/articles/empty</link>
  </item>
  <item>
    <title>Kaonavi &#x2013; update &#8212; done</title>
    <link>https://news.google.com/rss/articles/ghi</link>
    <pubDate>Mon, 01 Jan 2024 23:30:00 -0500</pubDate>
    <source url="https://example.com">Example Times</source>
  </item>
</channel></rss>"#;

    #[test]
    fn test_parse_feed_items() {
        let records = parse_feed(FEED, MAX_FEED_ITEMS).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].title, "SmartHR、新機能を発表 & 提携 - 日本経済新聞");
        assert_eq!(records[0].link, "https://news.google.com/rss/articles/abc");
        assert_eq!(records[0].date, "2024-03-15");
        assert_eq!(records[0].source, "日本経済新聞");
    }

    #[test]
    fn test_cdata_and_missing_fields() {
        let records = parse_feed(FEED, MAX_FEED_ITEMS).unwrap();
        assert_eq!(records[1].title, "HRBrain raises funding");
        assert_eq!(records[1].date, "");
        assert_eq!(records[1].source, DEFAULT_FEED_SOURCE);
    }

    #[test]
    fn test_numeric_entities_and_utc_date() {
        let records = parse_feed(FEED, MAX_FEED_ITEMS).unwrap();
        assert_eq!(records[2].title, "Kaonavi – update — done");
        assert_eq!(records[2].date, "2024-01-02");
        assert_eq!(records[2].source, "Example Times");
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let records = parse_feed(FEED, MAX_FEED_ITEMS).unwrap();
        assert!(records.iter().all(|r| !r.title.contains("Google ニュース")));
    }

    #[test]
    fn test_limit() {
        let records = parse_feed(FEED, 1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        let err = parse_feed("<rss><channel><item><title>x</wrong></item>", 20).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_search_url_encodes_query() {
        let source = GoogleNewsSource::new(Client::new());
        let url = source.search_url("SmartHR スマートHR");
        assert!(url.starts_with("https://news.google.com/rss/search?q=SmartHR%20"));
        assert!(url.ends_with("&hl=ja&gl=JP&ceid=JP:ja"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_format_pub_date() {
        assert_eq!(format_pub_date("Tue, 05 Mar 2024 10:00:00 +0900"), "2024-03-05");
        assert_eq!(format_pub_date(""), "");
    }
}
