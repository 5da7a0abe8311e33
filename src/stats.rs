//! Aggregate statistics over extracted records

use std::collections::HashSet;

use crate::magnitude::{format_magnitude, parse_magnitude};
use crate::models::{ParsingStats, PostRecord};

pub fn compute_stats(records: &[PostRecord]) -> ParsingStats {
    let with_views = records.iter().filter(|r| r.has_views()).count();

    let unique_authors = records
        .iter()
        .filter_map(|r| r.author.as_deref())
        .filter(|author| !author.is_empty())
        .collect::<HashSet<_>>()
        .len();

    ParsingStats {
        total: records.len(),
        with_views,
        without_views: records.len() - with_views,
        unique_authors,
        complete: records.iter().filter(|r| r.is_complete()).count(),
        average_views: average_views(records),
    }
}

/// Mean of the positive view counts in compact form, "0" when there are none.
pub fn average_views(records: &[PostRecord]) -> String {
    let counts: Vec<u64> = records
        .iter()
        .map(|r| parse_magnitude(&r.views))
        .filter(|&count| count > 0)
        .collect();

    if counts.is_empty() {
        return "0".to_string();
    }

    let sum: f64 = counts.iter().map(|&c| c as f64).sum();
    let average = (sum / counts.len() as f64).round() as u64;
    format_magnitude(average)
}
