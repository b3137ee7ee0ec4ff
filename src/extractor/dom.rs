//! Minimal read-only view of a parsed HTML tree.
//!
//! The strategies only need four capabilities: find descendants by tag,
//! read an attribute, read text, and walk children. [`Document`] and
//! [`DomNode`] expose exactly those, and `scraper` implements them below.

use scraper::{ElementRef, Html};

/// An element in a parsed document.
pub trait DomNode: Copy {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    /// All descendant elements with the given tag, in document order.
    /// The node itself is not included.
    fn find_all_by_tag(&self, tag: &str) -> Vec<Self>;

    /// First descendant element with the given tag.
    fn find_first_by_tag(&self, tag: &str) -> Option<Self> {
        self.find_all_by_tag(tag).into_iter().next()
    }

    fn get_attribute(&self, name: &str) -> Option<&str>;

    /// Descendant text nodes in document order, whitespace-trimmed, empty
    /// ones dropped.
    fn text_nodes(&self) -> Vec<&str>;

    /// Trimmed text nodes joined without separator.
    fn visible_text(&self) -> String {
        self.text_nodes().concat()
    }

    /// Direct element children in document order.
    fn ordered_children(&self) -> Vec<Self>;
}

/// A parsed document that can be searched by tag.
pub trait Document {
    type Node<'a>: DomNode
    where
        Self: 'a;

    /// Every element with the given tag, in document order.
    fn find_all_by_tag(&self, tag: &str) -> Vec<Self::Node<'_>>;
}

impl<'a> DomNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn find_all_by_tag(&self, tag: &str) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == tag)
            .collect()
    }

    fn find_first_by_tag(&self, tag: &str) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == tag)
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_nodes(&self) -> Vec<&str> {
        self.text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn ordered_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }
}

impl Document for Html {
    type Node<'a> = ElementRef<'a>;

    fn find_all_by_tag(&self, tag: &str) -> Vec<ElementRef<'_>> {
        self.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == tag)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <ul id="outer">
            <li>  <span>2024/03/15</span> <a href="/a">First   item</a></li>
            <li><ul><li>nested</li></ul></li>
          </ul>
        </body></html>"#;

    #[test]
    fn test_find_all_in_document_order() {
        let doc = Html::parse_document(PAGE);
        let lists = doc.find_all_by_tag("ul");
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].get_attribute("id"), Some("outer"));
    }

    #[test]
    fn test_find_all_excludes_self_and_includes_nested() {
        let doc = Html::parse_document(PAGE);
        let outer = doc.find_all_by_tag("ul")[0];
        assert_eq!(outer.find_all_by_tag("li").len(), 3);
        assert_eq!(outer.find_all_by_tag("ul").len(), 1);
    }

    #[test]
    fn test_ordered_children_are_direct_only() {
        let doc = Html::parse_document(PAGE);
        let outer = doc.find_all_by_tag("ul")[0];
        let children = outer.ordered_children();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.tag_name() == "li"));
    }

    #[test]
    fn test_text_nodes_are_trimmed() {
        let doc = Html::parse_document(PAGE);
        let li = doc.find_all_by_tag("li")[0];
        assert_eq!(li.text_nodes(), vec!["2024/03/15", "First   item"]);
    }

    #[test]
    fn test_visible_text_joins_without_separator() {
        let doc = Html::parse_document(r#"<p><a href="x"> Press <b>release</b> </a></p>"#);
        let a = doc.find_all_by_tag("a")[0];
        assert_eq!(a.visible_text(), "Pressrelease");
        assert_eq!(a.get_attribute("href"), Some("x"));
        assert_eq!(a.get_attribute("title"), None);
    }
}
