//! News listing spiders.
//!
//! Each spider knows where its listing page lives and which domains it may
//! fetch from. It hands the raw HTML back to the caller; extraction is done
//! by [`crate::extractor`] over a [`crate::page::ListingPage`].
//!
//! | Source | Module | Start URL |
//! |--------|--------|-----------|
//! | MarketWatch | [`marketwatch`] | `http://www.marketwatch.com/newsviewer` |

pub mod marketwatch;
