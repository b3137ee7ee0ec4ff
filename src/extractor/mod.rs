//! Heuristic news-listing extraction from arbitrary HTML.
//!
//! Corporate IR and news pages share no markup schema, so the extractor
//! tries an ordered cascade of structural strategies and keeps the first
//! candidate that passes its strategy's threshold:
//!
//! 1. [`ListStrategy`]: `<ul>` whose `<li>` children carry anchors with
//!    titles of at least 5 characters; accepted at 3 items.
//! 2. [`DefinitionListStrategy`]: `<dl>` with positionally paired
//!    `<dt>`/`<dd>`; accepted at 2 pairs.
//!
//! A page matching neither yields an empty list. That is an ordinary
//! outcome, not an error. Extraction is a pure function of the markup and
//! the base URL.

pub mod date;
pub mod dom;
pub mod strategies;

use crate::models::NewsRecord;
use dom::Document;
use scraper::Html;
use strategies::CandidateExtractor;
use tracing::{debug, instrument};
use url::Url;

pub use strategies::{DefinitionListStrategy, ExtractionCandidate, ListStrategy};

/// Ordered set of strategies; the first one returning a candidate wins.
pub struct Cascade<D: Document> {
    strategies: Vec<Box<dyn CandidateExtractor<D>>>,
}

impl<D: Document> Cascade<D> {
    pub fn new(strategies: Vec<Box<dyn CandidateExtractor<D>>>) -> Self {
        Self { strategies }
    }

    /// Append a strategy tried after the existing ones.
    pub fn with(mut self, strategy: impl CandidateExtractor<D> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn run(&self, document: &D, base_url: &Url) -> Vec<NewsRecord> {
        for strategy in &self.strategies {
            if let Some(candidate) = strategy.try_extract(document, base_url) {
                debug!(
                    strategy = candidate.strategy,
                    count = candidate.count(),
                    "strategy accepted a listing"
                );
                return candidate.records;
            }
            debug!(strategy = strategy.name(), "strategy found no listing");
        }
        Vec::new()
    }
}

impl<D: Document> Default for Cascade<D> {
    fn default() -> Self {
        Self::new(Vec::new())
            .with(ListStrategy::default())
            .with(DefinitionListStrategy::default())
    }
}

/// Parse `html` and run the default cascade on it.
///
/// # Arguments
///
/// * `html` - The decoded page
/// * `base_url` - URL relative links are resolved against
///
/// # Returns
///
/// The records of the first accepted listing, or an empty vector when no
/// strategy recognizes the page.
#[instrument(level = "debug", skip_all, fields(%base_url, bytes = html.len()))]
pub fn extract_news(html: &str, base_url: &Url) -> Vec<NewsRecord> {
    let document = Html::parse_document(html);
    Cascade::default().run(&document, base_url)
}
