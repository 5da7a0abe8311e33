use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::warn;

use crate::export::DEFAULT_BASE_URL;
use crate::selector::SelectorTable;
use crate::session::DEFAULT_MAX_SCROLLS;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_file: PathBuf,
    pub max_scrolls: usize,
    pub base_url: String,
    pub selector_table: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_file: PathBuf::from("scraped_reels.csv"),
            max_scrolls: DEFAULT_MAX_SCROLLS,
            base_url: DEFAULT_BASE_URL.to_string(),
            selector_table: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let config = Config {
            output_file: lookup("OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_file),
            max_scrolls: match lookup("MAX_SCROLLS") {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("MAX_SCROLLS must be a whole number, got {raw:?}"))?,
                None => defaults.max_scrolls,
            },
            base_url: lookup("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            selector_table: lookup("SELECTOR_TABLE").map(PathBuf::from),
        };

        config.validate();
        Ok(config)
    }

    fn validate(&self) {
        if self.max_scrolls > 100 {
            warn!(
                max_scrolls = self.max_scrolls,
                "a high number of scrolls may take a very long time"
            );
        }
    }

    /// The selector table to use: an explicit path wins over `SELECTOR_TABLE`,
    /// and the built-in table is the fallback.
    pub fn load_selector_table(&self, explicit: Option<&PathBuf>) -> Result<SelectorTable> {
        match explicit.or(self.selector_table.as_ref()) {
            Some(path) => SelectorTable::from_path(path)
                .with_context(|| format!("loading selector table {}", path.display())),
            None => Ok(SelectorTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_scrolls, 50);
        assert_eq!(config.base_url, "https://www.instagram.com");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OUTPUT_FILE", "out.csv"),
            ("MAX_SCROLLS", " 12 "),
            ("BASE_URL", "https://example.test/"),
            ("SELECTOR_TABLE", "selectors.json"),
        ]))
        .unwrap();
        assert_eq!(config.output_file, PathBuf::from("out.csv"));
        assert_eq!(config.max_scrolls, 12);
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.selector_table, Some(PathBuf::from("selectors.json")));
    }

    #[test]
    fn test_bad_max_scrolls() {
        let err = Config::from_lookup(lookup_from(&[("MAX_SCROLLS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MAX_SCROLLS"));
    }

    #[test]
    fn test_builtin_selector_table_without_paths() {
        let table = Config::default().load_selector_table(None).unwrap();
        assert_eq!(table, SelectorTable::default());
    }

    #[test]
    fn test_missing_selector_file_is_an_error() {
        let config = Config {
            selector_table: Some(PathBuf::from("/nonexistent/selectors.json")),
            ..Config::default()
        };
        assert!(config.load_selector_table(None).is_err());
    }
}
