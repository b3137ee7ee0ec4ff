//! Date recovery from unstructured text.
//!
//! Matches a Gregorian y-m-d token: four digits, one of `.` `/` `年`, one or
//! two digits, one of `.` `/` `月`, one or two digits, and a trailing `日`
//! when the day is written in kanji form. Separators may be mixed and the
//! numbers are not checked against the calendar.

use super::dom::DomNode;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[./年]\d{1,2}[./月]\d{1,2}日?").expect("date pattern compiles"));

/// First date-like substring of `text`.
pub fn find_date(text: &str) -> Option<&str> {
    DATE_PATTERN.find(text).map(|m| m.as_str())
}

/// Scan the node's text nodes in document order and return the first date
/// found in any of them.
pub fn first_date_in<N: DomNode>(node: &N) -> Option<String> {
    node.text_nodes()
        .into_iter()
        .find_map(find_date)
        .map(str::to_string)
}
