//! Selector configuration for the listing page.
//!
//! The defaults describe the MarketWatch newsviewer markup. Any subset of
//! them can be overridden from a YAML file passed with `--config`:
//!
//! ```yaml
//! headline: "div.nv-text-cont > h4"
//! read_more_class: more
//! ```
//!
//! Keys left out of the file keep their default values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// CSS selectors and attribute names used to query a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Outer entry node, one per headline.
    pub entry: String,
    /// Nodes carrying the identifier attribute.
    pub news_id: String,
    /// Nodes carrying the timestamp attribute.
    pub timestamp: String,
    /// Headline containers.
    pub headline: String,
    /// Name of the identifier attribute.
    pub id_attr: String,
    /// Name of the timestamp attribute.
    pub timestamp_attr: String,
    /// Class marking the anchor that links to the full article.
    pub read_more_class: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            entry: "li[id][timestamp]".to_string(),
            news_id: "li[id]".to_string(),
            timestamp: "li[timestamp]".to_string(),
            headline: r#"div[class="nv-text-cont"] > h4"#.to_string(),
            id_attr: "id".to_string(),
            timestamp_attr: "timestamp".to_string(),
            read_more_class: "read-more".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Parse a YAML document into a config, filling omitted keys with defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load the config from `path`, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(path, "Loaded selector configuration");
        Ok(config)
    }
}
