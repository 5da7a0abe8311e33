//! Library for extracting engagement counters of short-video posts from
//! captured or live page markup and exporting them as CSV

pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod extractor;
pub mod magnitude;
pub mod models;
pub mod parser;
pub mod selector;
pub mod session;
pub mod stats;

// Re-export main types and functions for convenient access
pub use error::{HarvestError, SelectorError};
pub use extractor::EngagementExtractor;
pub use models::{Engagement, ParsingStats, PostRecord, ScrapingStats, SENTINEL};
pub use parser::{parse_file, parse_static, Collection, PostCollector};
pub use selector::SelectorTable;
pub use session::{PageSession, ReplaySession, Sweeper};
pub use stats::compute_stats;
