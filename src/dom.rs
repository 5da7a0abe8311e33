//! DOM traversal helpers
//!
//! Extraction only ever needs a handful of read-only questions about the
//! markup tree, so they are gathered in [`TreeNode`]. Documents are parsed by
//! `scraper` (html5ever underneath); static files and live snapshots both go
//! through [`parse_html`].

use scraper::{ElementRef, Html, Selector};

/// Read-only query capability over one element of a markup tree.
pub trait TreeNode: Clone {
    /// Local tag name, lower case.
    fn tag_name(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// Parent if it is an element. Stops below the document node.
    fn parent_element(&self) -> Option<Self>;

    /// Concatenated descendant text, trimmed.
    fn text_content(&self) -> String;

    /// Descendants matching `selector` in document order, `self` excluded.
    /// Ancestor parts of the selector may match outside `self`, the same
    /// way `querySelectorAll` behaves.
    fn select_all(&self, selector: &Selector) -> Vec<Self>;

    fn select_first(&self, selector: &Selector) -> Option<Self> {
        self.select_all(selector).into_iter().next()
    }
}

/// Parse a whole document. The HTML5 algorithm always produces a tree, even
/// for empty or broken input.
pub fn parse_html(html: &str) -> Html {
    Html::parse_document(html)
}

impl<'a> TreeNode for ElementRef<'a> {
    fn tag_name(&self) -> String {
        self.value().name().to_string()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn text_content(&self) -> String {
        self.text().collect::<String>().trim().to_string()
    }

    fn select_all(&self, selector: &Selector) -> Vec<Self> {
        self.select(selector).collect()
    }

    fn select_first(&self, selector: &Selector) -> Option<Self> {
        self.select(selector).next()
    }
}

/// Nearest ancestor-or-self with the given tag.
pub fn closest<N: TreeNode>(node: &N, tag: &str) -> Option<N> {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if candidate.tag_name().eq_ignore_ascii_case(tag) {
            return Some(candidate);
        }
        current = candidate.parent_element();
    }
    None
}
