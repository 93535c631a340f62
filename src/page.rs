//! Structural queries over a listing page.
//!
//! The extractor never touches HTML directly. It asks a [`ListingPage`] for
//! the pieces it needs and works on the plain values that come back, so the
//! selection capability can be swapped out (a different markup, a test
//! double) without touching the extraction rules.
//!
//! [`HtmlListing`] is the `scraper`-backed implementation, driven by the
//! CSS selectors in [`SelectorConfig`].

use crate::config::SelectorConfig;
use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// The "read more" anchor inside a headline block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMoreLink {
    /// Full text content of the anchor, untrimmed.
    pub text: String,
    /// The `href` attribute, if present.
    pub href: Option<String>,
}

/// What the extractor needs to know about one headline container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadlineBlock {
    /// Whether the block has any anchor as a direct child.
    pub has_anchor: bool,
    /// The first direct text node of the block, untrimmed.
    pub first_text: Option<String>,
    /// The first direct-child anchor carrying the read-more class.
    pub read_more: Option<ReadMoreLink>,
}

#[cfg(test)]
impl HeadlineBlock {
    /// A block holding only plain headline text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            has_anchor: false,
            first_text: Some(text.into()),
            read_more: None,
        }
    }

    /// A block whose headline is wrapped in a read-more anchor.
    pub fn linked(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            has_anchor: true,
            first_text: None,
            read_more: Some(ReadMoreLink {
                text: text.into(),
                href: Some(href.into()),
            }),
        }
    }
}

/// One outer entry node, with every field read from its own subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub headline: Option<HeadlineBlock>,
}

/// Selection capability the extractor depends on.
///
/// The first three methods are selected independently of each other and
/// are only meaningful when paired by position. [`entries`](Self::entries)
/// returns the same information grouped per entry node.
///
/// All values are returned raw and fully materialized; trimming belongs to
/// the extractor.
pub trait ListingPage {
    /// Identifier attribute values, in document order.
    fn news_ids(&self) -> Vec<String>;

    /// Timestamp attribute values, in document order.
    fn timestamps(&self) -> Vec<String>;

    /// Headline containers, in document order.
    fn headline_blocks(&self) -> Vec<HeadlineBlock>;

    /// Outer entry nodes, in document order.
    fn entries(&self) -> Vec<Entry>;
}

/// Compiled form of a [`SelectorConfig`].
#[derive(Debug)]
pub struct PageSelectors {
    entry: Selector,
    news_id: Selector,
    timestamp: Selector,
    headline: Selector,
    id_attr: String,
    timestamp_attr: String,
    read_more_class: String,
}

impl PageSelectors {
    /// Compile every selector in `config`, failing on the first invalid one.
    pub fn compile(config: &SelectorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            entry: compile(&config.entry)?,
            news_id: compile(&config.news_id)?,
            timestamp: compile(&config.timestamp)?,
            headline: compile(&config.headline)?,
            id_attr: config.id_attr.clone(),
            timestamp_attr: config.timestamp_attr.clone(),
            read_more_class: config.read_more_class.clone(),
        })
    }
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::selector(css, e))
}

/// A parsed HTML listing page.
pub struct HtmlListing {
    document: Html,
    selectors: PageSelectors,
}

impl HtmlListing {
    /// Parse `html` as a full document.
    #[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
    pub fn parse(html: &str, selectors: PageSelectors) -> Self {
        let document = Html::parse_document(html);
        if !document.errors.is_empty() {
            debug!(count = document.errors.len(), "HTML parse recovered from errors");
        }
        Self {
            document,
            selectors,
        }
    }

    fn attr_values(&self, selector: &Selector, attr: &str) -> Vec<String> {
        self.document
            .select(selector)
            .filter_map(|el| el.value().attr(attr).map(str::to_string))
            .collect()
    }

    fn headline_block(&self, block: ElementRef<'_>) -> HeadlineBlock {
        let anchors: Vec<ElementRef<'_>> = block
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "a")
            .collect();

        let first_text = block
            .children()
            .find_map(|node| node.value().as_text().map(|text| text.to_string()));

        let read_more = anchors
            .iter()
            .find(|a| {
                a.value()
                    .classes()
                    .any(|class| class == self.selectors.read_more_class)
            })
            .map(|a| ReadMoreLink {
                text: a.text().collect(),
                href: a.value().attr("href").map(str::to_string),
            });

        HeadlineBlock {
            has_anchor: !anchors.is_empty(),
            first_text,
            read_more,
        }
    }
}

impl ListingPage for HtmlListing {
    fn news_ids(&self) -> Vec<String> {
        self.attr_values(&self.selectors.news_id, &self.selectors.id_attr)
    }

    fn timestamps(&self) -> Vec<String> {
        self.attr_values(&self.selectors.timestamp, &self.selectors.timestamp_attr)
    }

    fn headline_blocks(&self) -> Vec<HeadlineBlock> {
        self.document
            .select(&self.selectors.headline)
            .map(|block| self.headline_block(block))
            .collect()
    }

    fn entries(&self) -> Vec<Entry> {
        self.document
            .select(&self.selectors.entry)
            .map(|node| Entry {
                id: node
                    .value()
                    .attr(&self.selectors.id_attr)
                    .map(str::to_string),
                timestamp: node
                    .value()
                    .attr(&self.selectors.timestamp_attr)
                    .map(str::to_string),
                headline: node
                    .select(&self.selectors.headline)
                    .next()
                    .map(|block| self.headline_block(block)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING_HTML: &str = r#"
        <html><body>
        <ul id="latest">
            <li id="n1" timestamp=" 2016-01-01T10:00:00 ">
                <div class="nv-text-cont"><h4> Markets rally </h4></div>
            </li>
            <li id="n2" timestamp="2016-01-01T10:05:00">
                <div class="nv-text-cont">
                    <h4><a class="read-more" href="/story/123"> Stocks <b>surge</b> </a></h4>
                </div>
            </li>
            <li id="n3" timestamp="2016-01-01T10:10:00">
                <div class="nv-text-cont"><h4><a href="/other">Other link</a></h4></div>
            </li>
        </ul>
        </body></html>
    "#;

    fn listing(html: &str) -> HtmlListing {
        let selectors = PageSelectors::compile(&SelectorConfig::default()).unwrap();
        HtmlListing::parse(html, selectors)
    }

    #[test]
    fn test_attribute_sequences() {
        let page = listing(LISTING_HTML);
        // The outer <ul id="latest"> is not an <li>, so it is not picked up.
        assert_eq!(page.news_ids(), vec!["n1", "n2", "n3"]);
        assert_eq!(
            page.timestamps(),
            vec![" 2016-01-01T10:00:00 ", "2016-01-01T10:05:00", "2016-01-01T10:10:00"]
        );
    }

    #[test]
    fn test_headline_blocks() {
        let page = listing(LISTING_HTML);
        let blocks = page.headline_blocks();
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0], HeadlineBlock::plain(" Markets rally "));

        assert!(blocks[1].has_anchor);
        let link = blocks[1].read_more.as_ref().unwrap();
        assert_eq!(link.text, " Stocks surge ");
        assert_eq!(link.href.as_deref(), Some("/story/123"));

        assert!(blocks[2].has_anchor);
        assert_eq!(blocks[2].read_more, None);
    }

    #[test]
    fn test_entries_group_fields_per_node() {
        let page = listing(LISTING_HTML);
        let entries = page.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id.as_deref(), Some("n1"));
        assert_eq!(entries[0].timestamp.as_deref(), Some(" 2016-01-01T10:00:00 "));
        assert_eq!(entries[0].headline, Some(HeadlineBlock::plain(" Markets rally ")));
    }

    #[test]
    fn test_entry_without_headline() {
        let page = listing(r#"<ul><li id="x" timestamp="t"><span>no headline</span></li></ul>"#);
        let entries = page.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].headline, None);
    }

    #[test]
    fn test_headline_class_must_match_exactly() {
        let page = listing(
            r#"<div class="nv-text-cont wide"><h4>Skipped</h4></div>
               <div class="nv-text-cont"><h4>Kept</h4></div>"#,
        );
        let blocks = page.headline_blocks();
        assert_eq!(blocks, vec![HeadlineBlock::plain("Kept")]);
    }

    #[test]
    fn test_nested_anchor_is_not_a_direct_child() {
        let page = listing(
            r#"<div class="nv-text-cont"><h4>Title <span><a href="/x">x</a></span></h4></div>"#,
        );
        let blocks = page.headline_blocks();
        assert!(!blocks[0].has_anchor);
        assert_eq!(blocks[0].first_text.as_deref(), Some("Title "));
    }

    #[test]
    fn test_custom_read_more_class() {
        let config = SelectorConfig {
            read_more_class: "more".to_string(),
            ..Default::default()
        };
        let selectors = PageSelectors::compile(&config).unwrap();
        let page = HtmlListing::parse(
            r#"<div class="nv-text-cont"><h4><a class="more" href="/m">More</a></h4></div>"#,
            selectors,
        );
        let blocks = page.headline_blocks();
        assert_eq!(blocks[0].read_more.as_ref().unwrap().href.as_deref(), Some("/m"));
    }

    #[test]
    fn test_invalid_selector() {
        let config = SelectorConfig {
            headline: "[[[invalid".to_string(),
            ..Default::default()
        };
        let err = PageSelectors::compile(&config).unwrap_err();
        assert!(matches!(err, ExtractError::Selector { ref selector, .. } if selector == "[[[invalid"));
    }
}
