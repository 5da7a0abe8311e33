//! Engagement extraction around a single post anchor
//!
//! Neither the position nor the class names of the counters are stable, so
//! the extractor walks up from the anchor and tries two tiers at each level:
//!
//! 1. the engagement stats container from the selector table, whose list
//!    items hold likes then comments, plus a separate view counter probe;
//! 2. a broader scan of every magnitude-looking span under the current
//!    ancestor, ranked by value.
//!
//! The walk ends once all three fields are known, at the first level where
//! tier 1 leaves anything set, or after `max_ancestor_depth` levels. Whatever
//! was found is returned; every field is optional.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::dom::{self, TreeNode};
use crate::magnitude::{parse_magnitude, parse_plain_integer};
use crate::models::Engagement;
use crate::selector::CompiledSelectors;

/// Plain view counters at or below this are treated as unrelated numbers.
const VIEW_COUNT_FLOOR: u64 = 1000;

static VIEW_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d,]+[KkMm]").expect("view suffix pattern"));

static MAGNITUDE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d,]+(?:\.\d+)?[KkMm]?$").expect("magnitude pattern"));

fn looks_like_view_count(text: &str) -> bool {
    VIEW_SUFFIX.is_match(text) || parse_plain_integer(text) > VIEW_COUNT_FLOOR
}

fn fill(slot: &mut Option<String>, value: &str) {
    slot.get_or_insert_with(|| value.to_string());
}

pub struct EngagementExtractor<'a> {
    selectors: &'a CompiledSelectors,
}

impl<'a> EngagementExtractor<'a> {
    pub fn new(selectors: &'a CompiledSelectors) -> Self {
        EngagementExtractor { selectors }
    }

    pub fn extract<N: TreeNode>(&self, anchor: &N) -> Engagement {
        let mut result = Engagement::default();
        let mut container = dom::closest(anchor, &self.selectors.container_tag);

        for depth in 0..self.selectors.max_ancestor_depth {
            if result.is_complete() {
                break;
            }
            let Some(current) = container.take() else {
                break;
            };

            if let Some(stats) = self.engagement_container(&current) {
                self.read_list_items(&stats, &mut result);
                self.read_view_count(&current, &mut result);

                if result.any() {
                    trace!(depth, "engagement container matched");
                    break;
                }
            }

            if !result.is_complete() {
                self.broader_search(&current, &mut result);
            }

            container = current.parent_element();
        }

        result
    }

    fn engagement_container<N: TreeNode>(&self, scope: &N) -> Option<N> {
        self.selectors
            .engagement_containers
            .iter()
            .find_map(|selector| scope.select_first(selector))
    }

    /// First list item is likes, second is comments; the rest are ignored.
    fn read_list_items<N: TreeNode>(&self, stats: &N, result: &mut Engagement) {
        let items = stats.select_all(&self.selectors.list_item);
        for (index, item) in items.iter().take(2).enumerate() {
            let Some(value) = item
                .select_first(&self.selectors.stat_value)
                .map(|span| span.text_content())
                .filter(|text| !text.is_empty())
            else {
                continue;
            };

            if index == 0 {
                result.likes = Some(value);
            } else {
                result.comments = Some(value);
            }
        }
    }

    fn read_view_count<N: TreeNode>(&self, scope: &N, result: &mut Engagement) {
        let Some(candidate) = self
            .selectors
            .view_count
            .iter()
            .find_map(|selector| scope.select_first(selector))
        else {
            return;
        };

        let text = candidate.text_content();
        if !text.is_empty() && looks_like_view_count(&text) {
            result.views = Some(text);
        }
    }

    fn broader_search<N: TreeNode>(&self, scope: &N, result: &mut Engagement) {
        let values: Vec<String> = scope
            .select_all(&self.selectors.magnitude_span)
            .iter()
            .map(|span| span.text_content())
            .filter(|text| MAGNITUDE_TEXT.is_match(text))
            .collect();

        match values.as_slice() {
            [] => {}
            [only] => fill(&mut result.views, only),
            [first, second] => {
                fill(&mut result.likes, first);
                fill(&mut result.comments, second);
            }
            _ => {
                // views >= likes >= comments on this platform
                let mut ranked: Vec<(u64, &String)> =
                    values.iter().map(|v| (parse_magnitude(v), v)).collect();
                ranked.sort_by(|a, b| b.0.cmp(&a.0));
                fill(&mut result.views, ranked[0].1);
                fill(&mut result.likes, ranked[1].1);
                fill(&mut result.comments, ranked[2].1);
            }
        }
    }
}
