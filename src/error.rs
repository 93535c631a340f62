//! Error types for headline extraction.
//!
//! [`ExtractError`] covers everything the extractor and the page query
//! layer can report. Network, IO and config failures stay in the binary as
//! `Box<dyn Error>`.

use thiserror::Error;

/// Why a single entry could not be turned into a [`FeedItem`](crate::models::FeedItem).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// The entry node has no identifier attribute.
    #[error("missing id attribute")]
    MissingId,

    /// The entry node has no timestamp attribute.
    #[error("missing timestamp attribute")]
    MissingTimestamp,

    /// The entry node contains no headline block.
    #[error("missing headline block")]
    MissingHeadline,

    /// A plain headline has no direct text node.
    #[error("headline has no text")]
    MissingTitle,

    /// The headline text is whitespace only.
    #[error("headline text is empty")]
    EmptyTitle,

    /// The headline contains anchors, but none with the read-more class.
    #[error("headline has an anchor but no read-more link")]
    MissingReadMore,

    /// The read-more anchor has no `href`.
    #[error("read-more link has no href")]
    MissingHref,
}

/// Errors produced while extracting items from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The independently selected id, timestamp and headline sequences
    /// differ in length, so they cannot be paired by position.
    #[error(
        "listing sequences are not aligned: {ids} ids, {timestamps} timestamps, {headlines} headlines"
    )]
    AlignmentViolated {
        ids: usize,
        timestamps: usize,
        headlines: usize,
    },

    /// One entry was malformed.
    #[error("entry {position}{}: {reason}", id_suffix(.id))]
    Extraction {
        position: usize,
        id: Option<String>,
        reason: ExtractionFailure,
    },

    /// A configured CSS selector did not parse.
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

impl ExtractError {
    /// Creates an Extraction error for the entry at `position`.
    pub fn entry(position: usize, id: Option<&str>, reason: ExtractionFailure) -> Self {
        ExtractError::Extraction {
            position,
            id: id.map(str::to_string),
            reason,
        }
    }

    /// Creates a Selector error from a selector string and its parse error.
    pub fn selector(selector: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ExtractError::Selector {
            selector: selector.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if this is a per-entry failure rather than a page-level one.
    pub fn is_entry_failure(&self) -> bool {
        matches!(self, ExtractError::Extraction { .. })
    }
}
