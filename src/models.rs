//! Data models for extracted posts

/// Placeholder written for an engagement field that could not be found.
///
/// "0" is what the captured pages and earlier exports use, so it is kept at
/// the output boundary even though it cannot be told apart from a real zero.
/// Inside extraction the fields are `Option`s (see [`Engagement`]).
pub const SENTINEL: &str = "0";

/// Best-effort engagement counters for one post, as raw display strings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Engagement {
    pub views: Option<String>,
    pub likes: Option<String>,
    pub comments: Option<String>,
}

impl Engagement {
    pub fn any(&self) -> bool {
        self.views.is_some() || self.likes.is_some() || self.comments.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.views.is_some() && self.likes.is_some() && self.comments.is_some()
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Post reference as found in the markup; the de-duplication key.
    pub link: String,
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub author: Option<String>,
    pub post_id: Option<String>,
}

impl PostRecord {
    /// Fold an extraction result into a record, substituting [`SENTINEL`]
    /// for every missing field.
    pub fn new(
        link: String,
        engagement: Engagement,
        author: Option<String>,
        post_id: Option<String>,
    ) -> Self {
        let or_sentinel = |field: Option<String>| field.unwrap_or_else(|| SENTINEL.to_string());
        PostRecord {
            link,
            views: or_sentinel(engagement.views),
            likes: or_sentinel(engagement.likes),
            comments: or_sentinel(engagement.comments),
            author,
            post_id,
        }
    }

    pub fn has_views(&self) -> bool {
        self.views != SENTINEL
    }

    pub fn is_complete(&self) -> bool {
        self.has_views() && self.likes != SENTINEL && self.comments != SENTINEL
    }
}

/// Summary over a finished collection of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingStats {
    pub total: usize,
    pub with_views: usize,
    pub without_views: usize,
    pub unique_authors: usize,
    /// Records where none of the three counters is the sentinel.
    pub complete: usize,
    pub average_views: String,
}

/// Summary of a multi-sweep live session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapingStats {
    /// Records produced across all sweeps before merging.
    pub total_found: usize,
    pub unique_posts: usize,
    pub duplicates_removed: usize,
    pub sweeps_performed: usize,
}
