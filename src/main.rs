//! # marketspider
//!
//! Scrapes the "latest news" list of the MarketWatch newsviewer and emits
//! each headline as a structured record: id, timestamp, title and link.
//!
//! ## Usage
//!
//! ```sh
//! marketspider -j ./json
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one GET of the listing page (or a saved copy from disk),
//!    restricted to allow-listed domains
//! 2. **Querying**: the page is parsed and exposed through a
//!    [`page::ListingPage`]
//! 3. **Extraction**: [`extractor`] turns the page into `FeedItem`s
//! 4. **Output**: a JSON snapshot on stdout or in a dated file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extractor;
mod models;
mod outputs;
mod page;
mod scrapers;
mod utils;

use cli::Cli;
use config::SelectorConfig;
use error::ExtractError;
use extractor::{Extraction, Strategy, extract, extract_lenient};
use models::ListingSnapshot;
use outputs::json;
use page::{HtmlListing, PageSelectors};
use utils::ensure_writable_dir;

/// Parse `html` and extract its items.
///
/// Kept synchronous so the parsed document never lives across an await.
fn scrape_page(
    html: &str,
    selectors: PageSelectors,
    strategy: Strategy,
    keep_going: bool,
) -> Result<Extraction, ExtractError> {
    let page = HtmlListing::parse(html, selectors);
    if keep_going {
        extract_lenient(&page, strategy)
    } else {
        extract(&page, strategy).map(|items| Extraction {
            items,
            failures: Vec::new(),
        })
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr so stdout carries only JSON.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("marketspider starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Some(dir) = args.json_output_dir.as_deref() {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Selectors ----
    let selector_config = SelectorConfig::load(args.config.as_deref()).await?;
    let selectors = PageSelectors::compile(&selector_config)?;

    // ---- Fetch ----
    let html = match args.input.as_deref() {
        Some(path) => scrapers::marketwatch::read_listing(path).await,
        None => scrapers::marketwatch::fetch_listing(&args.url, &args.allowed_domains).await,
    };
    let html = match html {
        Ok(html) => html,
        Err(e) => {
            error!(source = %args.source(), error = %e, "Failed to load listing page");
            return Err(e);
        }
    };

    // ---- Extract ----
    let scraped_at = Local::now();
    let extraction = match scrape_page(&html, selectors, args.strategy, args.keep_going) {
        Ok(extraction) => extraction,
        Err(e) => {
            error!(source = %args.source(), error = %e, "Extraction failed; no items emitted");
            if e.is_entry_failure() {
                info!("Rerun with --keep-going to skip malformed entries");
            }
            return Err(e.into());
        }
    };

    let snapshot = ListingSnapshot {
        source: args.source().to_string(),
        scraped_at: scraped_at.to_rfc3339(),
        strategy: args.strategy.to_string(),
        items: extraction.items,
        failures: extraction
            .failures
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    // ---- Output ----
    match args.json_output_dir.as_deref() {
        Some(dir) => {
            if let Err(e) = json::write_snapshot(&snapshot, dir, &scraped_at).await {
                error!(error = %e, "Failed to write JSON snapshot");
                return Err(e);
            }
        }
        None => println!("{}", json::render_snapshot(&snapshot, args.compact)?),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        items = snapshot.items.len(),
        linked = snapshot.items.iter().filter(|item| item.has_link()).count(),
        failed = snapshot.failures.len(),
        "Execution complete"
    );

    Ok(())
}
