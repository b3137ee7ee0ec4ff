//! Raw HTML retrieval for IR and news pages.
//!
//! Pages are read as bytes and decoded here. Many Japanese IR sites still
//! serve Shift_JIS or EUC-JP and declare it only in a `<meta>` tag, so the
//! encoding is taken from the `Content-Type` charset, then from the
//! document's own `<meta charset>` / `http-equiv` declaration, then UTF-8.

use super::{Page, PageSource};
use crate::error::FetchError;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

/// Bytes scanned for a `<meta>` charset declaration.
const META_SNIFF_LIMIT: usize = 2048;

static CHARSET_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)charset\s*=\s*["']?([A-Za-z0-9_.:-]+)"#).expect("charset pattern compiles")
});

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?([A-Za-z0-9_.:-]+)"#).expect("meta pattern compiles")
});

#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn encoding_for(label: &[u8]) -> Option<&'static Encoding> {
    Encoding::for_label(label)
}

/// Pick the document encoding.
///
/// # Arguments
///
/// * `content_type` - The `Content-Type` header value, if any
/// * `body` - The raw response body
///
/// # Returns
///
/// The header charset when it names a known encoding, else the first
/// `<meta>` charset within the first 2 KiB, else UTF-8.
pub fn detect_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    let from_header = content_type
        .and_then(|ct| CHARSET_PARAM.captures(ct.as_bytes()))
        .and_then(|caps| encoding_for(&caps[1]));
    if let Some(encoding) = from_header {
        return encoding;
    }

    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    META_CHARSET
        .captures(head)
        .and_then(|caps| encoding_for(&caps[1]))
        .unwrap_or(UTF_8)
}

/// Decode `body` to text; a byte-order mark overrides the detected encoding.
pub fn decode_html(content_type: Option<&str>, body: &[u8]) -> String {
    let encoding = detect_encoding(content_type, body);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "page contained undecodable bytes");
    }
    text.into_owned()
}

impl PageSource for HttpPageSource {
    /// GET `url`; malformed URLs and non-2xx statuses are failures. The base
    /// URL is the final URL after redirects.
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let target = Url::parse(url)?;
        let response = self.client.get(target).send().await?.error_for_status()?;
        let base_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        let html = decode_html(content_type.as_deref(), &body);
        debug!(bytes = body.len(), %base_url, "fetched page");
        Ok(Page { html, base_url })
    }
}
