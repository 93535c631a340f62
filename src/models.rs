//! Data models for scraped headlines and the snapshot handed to the sink.
//!
//! - [`FeedItem`]: one headline from the listing page
//! - [`ListingSnapshot`]: every item scraped in a single run, plus metadata

use serde::{Deserialize, Serialize};

/// Value stored in [`FeedItem::url`] when a headline carries no link.
pub const NO_URL: &str = "n/a";

/// A single headline scraped from the listing page.
///
/// Items are built once by the extractor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedItem {
    /// The entry identifier, unique within one page snapshot.
    pub id: String,
    /// The trimmed headline text. Never empty.
    pub title: String,
    /// The "read more" link target, verbatim, or [`NO_URL`].
    pub url: String,
    /// The trimmed timestamp attribute, in whatever format the page uses.
    pub timestamp: String,
}

impl FeedItem {
    /// Whether the headline linked to a full article.
    pub fn has_link(&self) -> bool {
        self.url != NO_URL
    }
}

/// Everything produced by one scrape of one page.
///
/// `failures` is only populated when extraction runs in keep-going mode;
/// otherwise the first malformed entry aborts the run and no snapshot is
/// written at all.
#[derive(Debug, Deserialize, Serialize)]
pub struct ListingSnapshot {
    /// URL or file path the page was read from.
    pub source: String,
    /// Local time of the run, RFC 3339.
    pub scraped_at: String,
    /// Name of the extraction strategy used.
    pub strategy: String,
    /// Extracted headlines in document order.
    pub items: Vec<FeedItem>,
    /// Rendered per-entry errors that were skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}
