//! Typed errors for the harvesting library.
//!
//! The extraction core itself never fails: an empty result is a valid
//! outcome. These errors belong to the entry points around it (reading
//! snapshots, loading selector tables, writing output).

use std::path::PathBuf;

use thiserror::Error;

/// Problems with a structural selector or a selector table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,

    #[error("invalid selector `{selector}`: {message}")]
    Invalid { selector: String, message: String },

    #[error("selector table field `{field}` must not be empty")]
    EmptyField { field: &'static str },
}

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The markup handed to the static entry point had no content at all.
    #[error("document is empty")]
    EmptyDocument,

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid selector table: {0}")]
    SelectorTable(#[from] serde_json::Error),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid snapshot pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no snapshots to replay")]
    NoSnapshots,
}

impl HarvestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
