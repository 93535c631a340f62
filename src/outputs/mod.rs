//! Output sinks for scraped listings.
//!
//! - [`json`]: prints a [`ListingSnapshot`](crate::models::ListingSnapshot)
//!   to stdout or writes it to a dated JSON file

pub mod json;
