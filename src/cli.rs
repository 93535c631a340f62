//! Command-line interface definitions for marketspider.
//!
//! Options can be given as flags or, where noted, environment variables.

use crate::extractor::Strategy;
use crate::scrapers::marketwatch::{ALLOWED_DOMAIN, START_URL};
use clap::Parser;

/// Command-line arguments for the marketspider application.
///
/// # Examples
///
/// ```sh
/// # Scrape the live newsviewer and print JSON
/// marketspider
///
/// # Scrape a saved page, keep going past malformed entries
/// marketspider -i newsviewer.html --keep-going
///
/// # Write a dated snapshot using the positional strategy
/// marketspider -j ./json --strategy positional
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to fetch
    #[arg(short, long, env = "MARKETSPIDER_URL", default_value = START_URL)]
    pub url: String,

    /// Domains the spider may fetch from (repeatable)
    #[arg(
        short,
        long = "allowed-domain",
        env = "MARKETSPIDER_ALLOWED_DOMAINS",
        value_delimiter = ',',
        default_value = ALLOWED_DOMAIN
    )]
    pub allowed_domains: Vec<String>,

    /// Read the listing from a saved HTML file instead of fetching it (takes precedence over --url)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Optional path to a YAML file overriding the page selectors
    #[arg(short, long, env = "MARKETSPIDER_CONFIG")]
    pub config: Option<String>,

    /// How entries are located on the page
    #[arg(short, long, value_enum, default_value_t = Strategy::Entry)]
    pub strategy: Strategy,

    /// Skip malformed entries instead of failing the whole page
    #[arg(short, long)]
    pub keep_going: bool,

    /// Output directory for the JSON snapshot (prints to stdout when absent)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Print single-line JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    /// Where the page is read from: the input file if given, else the URL.
    pub fn source(&self) -> &str {
        self.input.as_deref().unwrap_or(&self.url)
    }
}
