//! Live extraction sweeps
//!
//! A live page only exposes the posts currently rendered, so extraction runs
//! once per scroll and the results are merged by link. The browser itself is
//! an external collaborator behind [`PageSession`]; [`ReplaySession`] plays
//! back snapshots captured from such a session.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::{HarvestError, Result};
use crate::models::{PostRecord, ScrapingStats};
use crate::parser::{Collection, PostCollector};

/// Default number of scrolls before a live run stops on its own.
pub const DEFAULT_MAX_SCROLLS: usize = 50;

/// The view of a rendered page the sweeper needs.
pub trait PageSession {
    /// Move the page on so that more posts are rendered.
    fn scroll(&mut self) -> Result<()>;

    /// Current markup of the page.
    fn snapshot(&mut self) -> Result<String>;

    fn reached_end(&mut self) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub records: Vec<PostRecord>,
    pub stats: ScrapingStats,
}

pub struct Sweeper<'a> {
    collector: &'a PostCollector,
    max_scrolls: usize,
}

impl<'a> Sweeper<'a> {
    pub fn new(collector: &'a PostCollector, max_scrolls: usize) -> Self {
        Sweeper {
            collector,
            max_scrolls,
        }
    }

    /// Scroll, extract and merge until the end of the feed or `max_scrolls`,
    /// then take one final sweep. Sweeps run strictly one after another.
    pub fn run<S: PageSession>(&self, session: &mut S) -> Result<SweepReport> {
        let mut merged = Collection::default();
        let mut total_found = 0;
        let mut scrolls = 0;

        while scrolls < self.max_scrolls {
            scrolls += 1;
            session.scroll()?;

            let (found, new_links) = self.sweep(session, &mut merged)?;
            total_found += found;
            info!(
                sweep = scrolls,
                found,
                new = new_links,
                total = merged.len(),
                "sweep complete"
            );

            if session.reached_end()? {
                info!(sweep = scrolls, "reached end of feed");
                break;
            }
        }

        let (found, new_links) = self.sweep(session, &mut merged)?;
        total_found += found;
        info!(found, new = new_links, total = merged.len(), "final sweep complete");

        let unique_posts = merged.len();
        Ok(SweepReport {
            records: merged.into_records(),
            stats: ScrapingStats {
                total_found,
                unique_posts,
                duplicates_removed: total_found.saturating_sub(unique_posts),
                sweeps_performed: scrolls,
            },
        })
    }

    fn sweep<S: PageSession>(&self, session: &mut S, merged: &mut Collection) -> Result<(usize, usize)> {
        let html = session.snapshot()?;
        let current = self.collector.collect_html(&html);
        let found = current.len();
        Ok((found, merged.merge(current)))
    }
}

/// Plays back captured snapshots in order, one per scroll.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    snapshots: Vec<PathBuf>,
    cursor: Option<usize>,
}

impl ReplaySession {
    pub fn new(snapshots: Vec<PathBuf>) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(HarvestError::NoSnapshots);
        }
        Ok(ReplaySession {
            snapshots,
            cursor: None,
        })
    }

    /// Every file matching a glob pattern, sorted by path.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let mut snapshots = Vec::new();
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) if path.is_file() => snapshots.push(path),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(HarvestError::io(path, e.into()));
                }
            }
        }
        snapshots.sort();
        Self::new(snapshots)
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn last(&self) -> usize {
        self.snapshots.len() - 1
    }
}

impl PageSession for ReplaySession {
    fn scroll(&mut self) -> Result<()> {
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.last()),
        });
        Ok(())
    }

    fn snapshot(&mut self) -> Result<String> {
        let path = &self.snapshots[self.cursor.unwrap_or(0)];
        info!(path = %path.display(), "replaying snapshot");
        fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))
    }

    fn reached_end(&mut self) -> Result<bool> {
        Ok(self.cursor == Some(self.last()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory session over a fixed list of pages.
    struct Pages {
        pages: Vec<String>,
        index: Option<usize>,
        scrolls: usize,
    }

    impl Pages {
        fn new(pages: &[&str]) -> Self {
            Pages {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                index: None,
                scrolls: 0,
            }
        }
    }

    impl PageSession for Pages {
        fn scroll(&mut self) -> Result<()> {
            self.scrolls += 1;
            self.index = Some(self.index.map_or(0, |i| (i + 1).min(self.pages.len() - 1)));
            Ok(())
        }

        fn snapshot(&mut self) -> Result<String> {
            Ok(self.pages[self.index.unwrap_or(0)].clone())
        }

        fn reached_end(&mut self) -> Result<bool> {
            Ok(self.index == Some(self.pages.len() - 1))
        }
    }

    fn tile(href: &str, likes: &str) -> String {
        format!(
            "<div><a href=\"{href}\">reel</a><div class=\"_aajz\"><ul>\
             <li><span class=\"html-span xdj266r\">{likes}</span></li></ul></div></div>"
        )
    }

    #[test]
    fn test_sweeps_merge_with_overwrite() {
        let first = format!("{}{}", tile("/a/reel/1/", "10"), tile("/b/reel/2/", "20"));
        let second = format!("{}{}", tile("/b/reel/2/", "25"), tile("/c/reel/3/", "30"));
        let mut session = Pages::new(&[&first, &second]);

        let collector = PostCollector::default();
        let report = Sweeper::new(&collector, 10).run(&mut session).unwrap();

        let links: Vec<&str> = report.records.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["/a/reel/1/", "/b/reel/2/", "/c/reel/3/"]);
        assert_eq!(report.records[1].likes, "25");

        // two scrolls plus the final sweep of the second page
        assert_eq!(report.stats.sweeps_performed, 2);
        assert_eq!(report.stats.total_found, 6);
        assert_eq!(report.stats.unique_posts, 3);
        assert_eq!(report.stats.duplicates_removed, 3);
    }

    #[test]
    fn test_stops_at_max_scrolls() {
        let page = tile("/a/reel/1/", "10");
        let mut session = Pages::new(&[&page, &page, &page, &page]);

        let collector = PostCollector::default();
        let report = Sweeper::new(&collector, 2).run(&mut session).unwrap();
        assert_eq!(session.scrolls, 2);
        assert_eq!(report.stats.sweeps_performed, 2);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_zero_scrolls_still_takes_final_sweep() {
        let page = tile("/a/reel/1/", "10");
        let mut session = Pages::new(&[&page]);

        let collector = PostCollector::default();
        let report = Sweeper::new(&collector, 0).run(&mut session).unwrap();
        assert_eq!(report.stats.sweeps_performed, 0);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_replay_requires_snapshots() {
        assert!(matches!(
            ReplaySession::new(Vec::new()),
            Err(HarvestError::NoSnapshots)
        ));
    }

    #[test]
    fn test_replay_cursor_advances_and_clamps() {
        let mut session =
            ReplaySession::new(vec![PathBuf::from("a.html"), PathBuf::from("b.html")]).unwrap();
        assert!(!session.reached_end().unwrap());
        session.scroll().unwrap();
        assert_eq!(session.cursor, Some(0));
        assert!(!session.reached_end().unwrap());
        session.scroll().unwrap();
        session.scroll().unwrap();
        assert_eq!(session.cursor, Some(1));
        assert!(session.reached_end().unwrap());
    }
}
