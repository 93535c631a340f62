//! Headline extraction.
//!
//! Turns a [`ListingPage`] into [`FeedItem`]s. Each entry is handled in
//! isolation:
//!
//! 1. the timestamp and id are trimmed;
//! 2. a headline without anchors yields its first text node as the title
//!    and [`NO_URL`] as the link;
//! 3. a headline with anchors yields the read-more anchor's text as the
//!    title and its `href`, untouched, as the link.
//!
//! Two strategies decide how entries are found. [`Strategy::Entry`] walks
//! the outer entry nodes and reads every field from inside one node.
//! [`Strategy::Positional`] pairs three independently selected sequences
//! by index, after checking that their lengths agree.
//!
//! The page's sequences are selected in full before iteration starts;
//! only building and validating each item is deferred until the iterator
//! reaches that entry. The iterators own their selected values and never
//! touch the page again, so asking for a fresh iterator over the same page
//! gives the same sequence.

use crate::error::{ExtractError, ExtractionFailure};
use crate::models::{FeedItem, NO_URL};
use crate::page::{Entry, HeadlineBlock, ListingPage};
use clap::ValueEnum;
use itertools::{Itertools, izip};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// How entries are located on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// One outer node per entry; all fields come from its subtree.
    #[default]
    Entry,
    /// Ids, timestamps and headlines selected separately and zipped by index.
    Positional,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Entry => write!(f, "entry"),
            Strategy::Positional => write!(f, "positional"),
        }
    }
}

/// Items that were extracted and entries that failed, side by side.
#[derive(Debug, Default)]
pub struct Extraction {
    pub items: Vec<FeedItem>,
    pub failures: Vec<ExtractError>,
}

/// Build the item for one entry.
///
/// `position` and the raw id are only used to label a failure.
pub fn build_item(
    position: usize,
    id: &str,
    timestamp: &str,
    headline: &HeadlineBlock,
) -> Result<FeedItem, ExtractError> {
    let id = id.trim();
    let fail = |reason| ExtractError::entry(position, Some(id), reason);

    let (title, url) = if !headline.has_anchor {
        let text = headline
            .first_text
            .as_deref()
            .ok_or_else(|| fail(ExtractionFailure::MissingTitle))?;
        (text.trim(), NO_URL)
    } else {
        let link = headline
            .read_more
            .as_ref()
            .ok_or_else(|| fail(ExtractionFailure::MissingReadMore))?;
        let href = link
            .href
            .as_deref()
            .filter(|href| !href.is_empty())
            .ok_or_else(|| fail(ExtractionFailure::MissingHref))?;
        (link.text.trim(), href)
    };

    if title.is_empty() {
        return Err(fail(ExtractionFailure::EmptyTitle));
    }

    Ok(FeedItem {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        timestamp: timestamp.trim().to_string(),
    })
}

fn build_entry(position: usize, entry: &Entry) -> Result<FeedItem, ExtractError> {
    let id = entry
        .id
        .as_deref()
        .ok_or_else(|| ExtractError::entry(position, None, ExtractionFailure::MissingId))?;
    let fail = |reason| ExtractError::entry(position, Some(id.trim()), reason);
    let timestamp = entry
        .timestamp
        .as_deref()
        .ok_or_else(|| fail(ExtractionFailure::MissingTimestamp))?;
    let headline = entry
        .headline
        .as_ref()
        .ok_or_else(|| fail(ExtractionFailure::MissingHeadline))?;
    build_item(position, id, timestamp, headline)
}

/// Per-entry results from the outer entry nodes, in document order.
///
/// The entries are selected eagerly; each item is built when it is pulled.
pub fn entry_items<P>(page: &P) -> impl Iterator<Item = Result<FeedItem, ExtractError>>
where
    P: ListingPage + ?Sized,
{
    page.entries()
        .into_iter()
        .enumerate()
        .map(|(position, entry)| build_entry(position, &entry))
}

/// Per-entry results from the three positional sequences.
///
/// Fails up front with [`ExtractError::AlignmentViolated`] when the
/// sequences differ in length. Equal lengths are necessary but not
/// sufficient: if the page pairs nodes differently than their order
/// suggests, the items come out mismatched and nothing here can tell.
pub fn positional_items<P>(
    page: &P,
) -> Result<impl Iterator<Item = Result<FeedItem, ExtractError>>, ExtractError>
where
    P: ListingPage + ?Sized,
{
    let ids = page.news_ids();
    let timestamps = page.timestamps();
    let headlines = page.headline_blocks();

    if ids.len() != timestamps.len() || ids.len() != headlines.len() {
        return Err(ExtractError::AlignmentViolated {
            ids: ids.len(),
            timestamps: timestamps.len(),
            headlines: headlines.len(),
        });
    }

    Ok(izip!(ids, timestamps, headlines)
        .enumerate()
        .map(|(position, (id, timestamp, headline))| {
            build_item(position, &id, &timestamp, &headline)
        }))
}

/// Per-entry results for `page` using `strategy`.
pub fn items<'a, P>(
    page: &'a P,
    strategy: Strategy,
) -> Result<Box<dyn Iterator<Item = Result<FeedItem, ExtractError>> + 'a>, ExtractError>
where
    P: ListingPage + ?Sized + 'a,
{
    Ok(match strategy {
        Strategy::Entry => Box::new(entry_items(page)),
        Strategy::Positional => Box::new(positional_items(page)?),
    })
}

/// Extract every item, aborting on the first malformed entry.
///
/// On failure no items are returned.
#[instrument(level = "info", skip(page))]
pub fn extract<P>(page: &P, strategy: Strategy) -> Result<Vec<FeedItem>, ExtractError>
where
    P: ListingPage + ?Sized,
{
    let items = items(page, strategy)?.collect::<Result<Vec<_>, _>>()?;
    info!(count = items.len(), "Extracted headlines");
    Ok(items)
}

/// Extract every well-formed item and keep the failures for the caller.
///
/// Page-level errors such as misaligned sequences still fail the call.
#[instrument(level = "info", skip(page))]
pub fn extract_lenient<P>(page: &P, strategy: Strategy) -> Result<Extraction, ExtractError>
where
    P: ListingPage + ?Sized,
{
    let (items, failures): (Vec<FeedItem>, Vec<ExtractError>) =
        items(page, strategy)?.partition_result();

    for failure in &failures {
        warn!(error = %failure, "Skipping malformed entry");
    }
    if failures.is_empty() {
        debug!("No malformed entries");
    }
    info!(
        count = items.len(),
        failed = failures.len(),
        "Extracted headlines"
    );
    Ok(Extraction { items, failures })
}
