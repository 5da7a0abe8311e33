//! Post discovery over a whole document
//!
//! [`PostCollector`] finds every post anchor, runs the engagement extractor
//! on it and keeps one record per link in first-insertion order. The same
//! collector serves static snapshots ([`parse_static`], [`parse_file`]) and
//! the live sweeps in [`crate::session`].

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::dom::{self, TreeNode};
use crate::error::{HarvestError, Result, SelectorError};
use crate::extractor::EngagementExtractor;
use crate::models::PostRecord;
use crate::selector::{CompiledSelectors, SelectorTable};

/// Records unique by link, in the order each link was first seen.
///
/// Inserting a link that is already present replaces its record but keeps
/// its position.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: IndexMap<String, PostRecord>,
    anchors_seen: usize,
}

impl Collection {
    /// Insert or overwrite. Returns true when the link was new.
    pub fn insert(&mut self, record: PostRecord) -> bool {
        self.records.insert(record.link.clone(), record).is_none()
    }

    /// Fold another collection in with the same overwrite rule. Returns how
    /// many links were new.
    pub fn merge(&mut self, other: Collection) -> usize {
        self.anchors_seen += other.anchors_seen;
        let mut new_links = 0;
        for record in other.records.into_values() {
            if self.insert(record) {
                new_links += 1;
            }
        }
        new_links
    }

    /// Post anchors seen before de-duplication.
    pub fn anchors_seen(&self) -> usize {
        self.anchors_seen
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PostRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<PostRecord> {
        self.records.into_values().collect()
    }
}

/// Author and post id around the marker segment of a post link:
/// `/{author}/reel/{id}/` gives `(author, id)`.
pub fn split_post_link(href: &str, marker: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = href.split('/').collect();
    let Some(index) = parts.iter().position(|part| *part == marker) else {
        return (None, None);
    };

    let non_empty = |part: Option<&&str>| part.filter(|p| !p.is_empty()).map(|p| p.to_string());
    let author = index.checked_sub(1).and_then(|i| non_empty(parts.get(i)));
    let post_id = non_empty(parts.get(index + 1));
    (author, post_id)
}

#[derive(Debug, Clone, Default)]
pub struct PostCollector {
    selectors: CompiledSelectors,
}

impl PostCollector {
    pub fn new(selectors: CompiledSelectors) -> Self {
        PostCollector { selectors }
    }

    pub fn from_table(table: &SelectorTable) -> std::result::Result<Self, SelectorError> {
        Ok(PostCollector::new(table.compile()?))
    }

    /// Walk the tree under `root` and collect one record per post link.
    /// A document without posts gives an empty collection.
    pub fn collect<N: TreeNode>(&self, root: &N) -> Collection {
        let extractor = EngagementExtractor::new(&self.selectors);
        let mut collection = Collection::default();

        for anchor in root.select_all(&self.selectors.post_anchor) {
            collection.anchors_seen += 1;

            let href = anchor.attr("href").unwrap_or_default();
            let (author, post_id) = split_post_link(&href, &self.selectors.post_path_marker);
            let engagement = extractor.extract(&anchor);
            debug!(
                link = %href,
                views = ?engagement.views,
                likes = ?engagement.likes,
                comments = ?engagement.comments,
                "extracted post"
            );

            collection.insert(PostRecord::new(href, engagement, author, post_id));
        }

        info!(
            anchors = collection.anchors_seen,
            unique = collection.len(),
            selectors = %self.selectors.version,
            "collected posts"
        );
        collection
    }

    pub fn collect_html(&self, html: &str) -> Collection {
        let document = dom::parse_html(html);
        self.collect(&document.root_element())
    }
}

/// Static entry point: blank markup is an error here, while a document with
/// no posts is simply an empty collection.
pub fn parse_static(html: &str, collector: &PostCollector) -> Result<Collection> {
    if html.trim().is_empty() {
        return Err(HarvestError::EmptyDocument);
    }
    Ok(collector.collect_html(html))
}

pub fn parse_file(path: &Path, collector: &PostCollector) -> Result<Collection> {
    let bytes = fs::read(path).map_err(|e| HarvestError::io(path, e))?;
    info!(
        path = %path.display(),
        size_kb = bytes.len() / 1024,
        "loaded snapshot"
    );
    // Saved pages are not always clean UTF-8; stray bytes become U+FFFD.
    parse_static(&String::from_utf8_lossy(&bytes), collector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL;

    const STATS: &str = "<div class=\"_aajz\"><ul>\
        <li><span class=\"html-span xdj266r\">{likes}</span></li>\
        <li><span class=\"html-span xdj266r\">{comments}</span></li></ul></div>";

    fn tile(href: &str, likes: &str, comments: &str) -> String {
        let stats = STATS
            .replace("{likes}", likes)
            .replace("{comments}", comments);
        format!("<div><a href=\"{href}\">reel</a>{stats}</div>")
    }

    fn page(tiles: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", tiles.concat())
    }

    #[test]
    fn test_split_post_link_relative() {
        assert_eq!(
            split_post_link("/someone/reel/C8xYz/", "reel"),
            (Some("someone".to_string()), Some("C8xYz".to_string()))
        );
    }

    #[test]
    fn test_split_post_link_absolute() {
        assert_eq!(
            split_post_link("https://www.instagram.com/someone/reel/C8xYz/", "reel"),
            (Some("someone".to_string()), Some("C8xYz".to_string()))
        );
    }

    #[test]
    fn test_split_post_link_without_author() {
        assert_eq!(
            split_post_link("/reel/C8xYz/", "reel"),
            (None, Some("C8xYz".to_string()))
        );
    }

    #[test]
    fn test_split_post_link_without_marker() {
        assert_eq!(split_post_link("/someone/p/C8xYz/", "reel"), (None, None));
        assert_eq!(split_post_link("/someone/reels/", "reel"), (None, None));
    }

    #[test]
    fn test_collect_in_document_order() {
        let html = page(&[
            tile("/a/reel/1/", "10", "1"),
            tile("/b/reel/2/", "20", "2"),
            tile("/c/reel/3/", "30", "3"),
        ]);
        let collection = PostCollector::default().collect_html(&html);
        let links: Vec<&str> = collection.records().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["/a/reel/1/", "/b/reel/2/", "/c/reel/3/"]);
        assert_eq!(collection.anchors_seen(), 3);

        let first = collection.records().next().unwrap();
        assert_eq!(first.likes, "10");
        assert_eq!(first.comments, "1");
        assert_eq!(first.views, SENTINEL);
        assert_eq!(first.author.as_deref(), Some("a"));
        assert_eq!(first.post_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_duplicate_link_keeps_later_occurrence() {
        let html = page(&[
            tile("/a/reel/1/", "10", "1"),
            tile("/b/reel/2/", "20", "2"),
            tile("/a/reel/1/", "11", "4"),
        ]);
        let collection = PostCollector::default().collect_html(&html);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.anchors_seen(), 3);

        let records = collection.into_records();
        assert_eq!(records[0].link, "/a/reel/1/");
        assert_eq!(records[0].likes, "11");
        assert_eq!(records[0].comments, "4");
        assert_eq!(records[1].link, "/b/reel/2/");
    }

    #[test]
    fn test_non_post_anchors_are_ignored() {
        let html = page(&[
            "<div><a href=\"/explore/\">Explore</a></div>".to_string(),
            "<div><a>no href</a></div>".to_string(),
            tile("/a/reel/1/", "10", "1"),
        ]);
        let collection = PostCollector::default().collect_html(&html);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.anchors_seen(), 1);
    }

    #[test]
    fn test_unmatched_markup_gives_sentinels() {
        let html = page(&["<div><a href=\"/a/reel/1/\">reel</a><p>hello</p></div>".to_string()]);
        let records = PostCollector::default().collect_html(&html).into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].views, SENTINEL);
        assert_eq!(records[0].likes, SENTINEL);
        assert_eq!(records[0].comments, SENTINEL);
    }

    #[test]
    fn test_no_posts_is_empty_not_an_error() {
        let collection = parse_static(
            "<html><body><p>nothing</p></body></html>",
            &PostCollector::default(),
        )
        .unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.anchors_seen(), 0);
    }

    #[test]
    fn test_blank_document_is_an_error() {
        assert!(matches!(
            parse_static("  \n ", &PostCollector::default()),
            Err(HarvestError::EmptyDocument)
        ));
    }

    #[test]
    fn test_collect_twice_and_merge_equals_once() {
        let html = page(&[
            tile("/a/reel/1/", "10", "1"),
            tile("/b/reel/2/", "20", "2"),
        ]);
        let collector = PostCollector::default();
        let once = collector.collect_html(&html);

        let mut twice = collector.collect_html(&html);
        let new_links = twice.merge(collector.collect_html(&html));
        assert_eq!(new_links, 0);

        assert_eq!(twice.into_records(), once.into_records());
    }

    #[test]
    fn test_merge_overwrites_and_appends() {
        let collector = PostCollector::default();
        let mut merged = collector.collect_html(&page(&[tile("/a/reel/1/", "10", "1")]));
        let new_links = merged.merge(collector.collect_html(&page(&[
            tile("/b/reel/2/", "20", "2"),
            tile("/a/reel/1/", "15", "3"),
        ])));
        assert_eq!(new_links, 1);
        assert_eq!(merged.anchors_seen(), 3);

        let records = merged.into_records();
        assert_eq!(records[0].link, "/a/reel/1/");
        assert_eq!(records[0].likes, "15");
        assert_eq!(records[1].link, "/b/reel/2/");
    }
}
