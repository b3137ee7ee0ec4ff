//! Structural strategies for recognising a news listing.
//!
//! Each strategy scans every candidate container of its kind in document
//! order and accepts the first one whose batch of qualifying items reaches
//! the strategy's threshold. Thresholds keep navigation menus and layout
//! lists out while still accepting small "latest news" widgets.

use super::date::first_date_in;
use super::dom::{Document, DomNode};
use crate::models::NewsRecord;
use tracing::debug;
use url::Url;

/// Provenance label attached to every record found on an IR/news page.
pub const IR_SOURCE_LABEL: &str = "IR";

/// Upper bound on records taken from an accepted container.
pub const MAX_RECORDS: usize = 20;

/// A batch of records proposed by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCandidate {
    pub strategy: &'static str,
    pub records: Vec<NewsRecord>,
}

impl ExtractionCandidate {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// One structural heuristic. Returns `Some` only when some container in the
/// document met the acceptance threshold.
pub trait CandidateExtractor<D: Document> {
    fn name(&self) -> &'static str;

    fn try_extract(&self, document: &D, base_url: &Url) -> Option<ExtractionCandidate>;
}

/// Resolve `href` against `base_url`. Absolute values pass through
/// unchanged; empty or unresolvable ones become `""`.
pub fn resolve_link(href: &str, base_url: &Url) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base_url
        .join(href)
        .map(|url| url.to_string())
        .unwrap_or_default()
}

fn link_of<N: DomNode>(anchor: &N, base_url: &Url) -> String {
    anchor
        .get_attribute("href")
        .map(|href| resolve_link(href, base_url))
        .unwrap_or_default()
}

/// `<ul>` → `<li>` → first `<a>`.
#[derive(Debug, Clone)]
pub struct ListStrategy {
    /// Qualifying items a list needs before it is accepted.
    pub min_items: usize,
    /// Titles shorter than this (in characters) are treated as noise.
    pub min_title_chars: usize,
    pub max_records: usize,
}

impl Default for ListStrategy {
    fn default() -> Self {
        Self {
            min_items: 3,
            min_title_chars: 5,
            max_records: MAX_RECORDS,
        }
    }
}

impl ListStrategy {
    fn record_for<N: DomNode>(&self, item: &N, base_url: &Url) -> Option<NewsRecord> {
        let anchor = item.find_first_by_tag("a")?;
        let title = anchor.visible_text();
        if title.chars().count() < self.min_title_chars {
            return None;
        }
        Some(NewsRecord {
            date: first_date_in(item).unwrap_or_default(),
            title,
            link: link_of(&anchor, base_url),
            source: IR_SOURCE_LABEL.to_string(),
        })
    }
}

impl<D: Document> CandidateExtractor<D> for ListStrategy {
    fn name(&self) -> &'static str {
        "list"
    }

    fn try_extract(&self, document: &D, base_url: &Url) -> Option<ExtractionCandidate> {
        for (index, list) in document.find_all_by_tag("ul").iter().enumerate() {
            // Direct <li> children only: items of a nested <ul> belong to that
            // list. <dt>/<dd> pairing below uses descendants instead.
            let mut batch: Vec<NewsRecord> = list
                .ordered_children()
                .iter()
                .filter(|child| child.tag_name() == "li")
                .filter_map(|item| self.record_for(item, base_url))
                .collect();

            if batch.len() >= self.min_items {
                debug!(list_index = index, items = batch.len(), "accepted <ul> listing");
                batch.truncate(self.max_records);
                return Some(ExtractionCandidate {
                    strategy: CandidateExtractor::<D>::name(self),
                    records: batch,
                });
            }
        }
        None
    }
}

/// `<dl>` with `<dt>`/`<dd>` paired by position.
#[derive(Debug, Clone)]
pub struct DefinitionListStrategy {
    /// `<dt>` elements a list needs before it is considered at all.
    pub min_terms: usize,
    /// Qualifying pairs a list needs before it is accepted.
    pub min_pairs: usize,
    pub max_records: usize,
}

impl Default for DefinitionListStrategy {
    fn default() -> Self {
        Self {
            min_terms: 2,
            min_pairs: 2,
            max_records: MAX_RECORDS,
        }
    }
}

impl DefinitionListStrategy {
    fn record_for<N: DomNode>(&self, term: &N, description: &N, base_url: &Url) -> Option<NewsRecord> {
        let anchor = description
            .find_first_by_tag("a")
            .or_else(|| term.find_first_by_tag("a"))?;
        let title = anchor.visible_text();
        // Records never carry an empty title.
        if title.is_empty() {
            return None;
        }
        let date = first_date_in(term)
            .or_else(|| first_date_in(description))
            .unwrap_or_default();
        Some(NewsRecord {
            date,
            title,
            link: link_of(&anchor, base_url),
            source: IR_SOURCE_LABEL.to_string(),
        })
    }
}

impl<D: Document> CandidateExtractor<D> for DefinitionListStrategy {
    fn name(&self) -> &'static str {
        "definition_list"
    }

    fn try_extract(&self, document: &D, base_url: &Url) -> Option<ExtractionCandidate> {
        for (index, list) in document.find_all_by_tag("dl").iter().enumerate() {
            let terms = list.find_all_by_tag("dt");
            if terms.len() < self.min_terms {
                continue;
            }
            let descriptions = list.find_all_by_tag("dd");

            let mut batch: Vec<NewsRecord> = terms
                .iter()
                .zip(descriptions.iter())
                .filter_map(|(term, description)| self.record_for(term, description, base_url))
                .collect();

            if batch.len() >= self.min_pairs {
                debug!(list_index = index, items = batch.len(), "accepted <dl> listing");
                batch.truncate(self.max_records);
                return Some(ExtractionCandidate {
                    strategy: CandidateExtractor::<D>::name(self),
                    records: batch,
                });
            }
        }
        None
    }
}
