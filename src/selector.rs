//! Structural selectors and the versioned selector table
//!
//! The target site's markup is third-party and its generated class names
//! change without notice. Everything the extractor matches against lives in a
//! [`SelectorTable`] that can be loaded from JSON, so a markup change only
//! needs a new table. Selectors are ordinary CSS, parsed by `scraper`.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result, SelectorError};

/// Parse one CSS selector from the table.
pub fn parse_selector(source: &str) -> std::result::Result<Selector, SelectorError> {
    if source.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    Selector::parse(source).map_err(|e| SelectorError::Invalid {
        selector: source.to_string(),
        message: e.to_string(),
    })
}

fn parse_all(sources: &[String]) -> std::result::Result<Vec<Selector>, SelectorError> {
    sources.iter().map(|s| parse_selector(s)).collect()
}

/// The injectable, versioned description of the target markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTable {
    pub version: String,
    /// Anchors that link to a post.
    pub post_anchor: String,
    /// Path segment that precedes the post id (and follows the author).
    pub post_path_marker: String,
    /// Tag of the block ancestor where the ancestor walk starts.
    pub container_tag: String,
    pub max_ancestor_depth: usize,
    /// Candidates for the engagement stats container; the first match wins.
    pub engagement_containers: Vec<String>,
    pub list_item: String,
    pub stat_value: String,
    /// Ways of locating the view counter, tried in order; the first selector
    /// that finds an element wins.
    pub view_count: Vec<String>,
    /// Class signature of the spans the broader fallback collects.
    pub magnitude_span: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        SelectorTable {
            version: "instagram-2024.1".to_string(),
            post_anchor: r#"a[href*="/reel/"]"#.to_string(),
            post_path_marker: "reel".to_string(),
            container_tag: "div".to_string(),
            max_ancestor_depth: 6,
            engagement_containers: vec![
                "div._aajz".to_string(),
                "ul.x6s0dn4.x972fbf".to_string(),
            ],
            list_item: "li".to_string(),
            stat_value: "span.html-span.xdj266r".to_string(),
            view_count: vec![
                "span.html-span.xdj266r:not(li span)".to_string(),
                "div._aajy span.html-span.xdj266r".to_string(),
            ],
            magnitude_span: "span.html-span.xdj266r.x14z9mp.xat24cr.x1lziwak.xexx8yu.xyri2b.x18d9i69.x1c1uobl.x1hl2dhg.x16tdsg8.x1vvkbs".to_string(),
        }
    }
}

impl SelectorTable {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse every selector once so that a broken table is rejected before
    /// any extraction runs.
    pub fn compile(&self) -> std::result::Result<CompiledSelectors, SelectorError> {
        for (field, value) in [
            ("post_path_marker", &self.post_path_marker),
            ("container_tag", &self.container_tag),
        ] {
            if value.trim().is_empty() {
                return Err(SelectorError::EmptyField { field });
            }
        }
        if self.engagement_containers.is_empty() {
            return Err(SelectorError::EmptyField {
                field: "engagement_containers",
            });
        }

        Ok(CompiledSelectors {
            version: self.version.clone(),
            post_anchor: parse_selector(&self.post_anchor)?,
            post_path_marker: self.post_path_marker.clone(),
            container_tag: self.container_tag.clone(),
            max_ancestor_depth: self.max_ancestor_depth,
            engagement_containers: parse_all(&self.engagement_containers)?,
            list_item: parse_selector(&self.list_item)?,
            stat_value: parse_selector(&self.stat_value)?,
            view_count: parse_all(&self.view_count)?,
            magnitude_span: parse_selector(&self.magnitude_span)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub version: String,
    pub post_anchor: Selector,
    pub post_path_marker: String,
    pub container_tag: String,
    pub max_ancestor_depth: usize,
    pub engagement_containers: Vec<Selector>,
    pub list_item: Selector,
    pub stat_value: Selector,
    pub view_count: Vec<Selector>,
    pub magnitude_span: Selector,
}

impl Default for CompiledSelectors {
    fn default() -> Self {
        SelectorTable::default()
            .compile()
            .expect("built-in selector table is valid")
    }
}
