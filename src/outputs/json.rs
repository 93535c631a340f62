//! JSON output for scraped listings.
//!
//! A [`ListingSnapshot`] is either printed to stdout or written under a
//! date-based directory structure:
//!
//! ```text
//! json_output_dir/
//! └── 2016-01-01/
//!     ├── 10-00-00-000.json
//!     └── 16-30-12-481.json
//! ```
//!
//! Existing snapshot files are never overwritten.

use crate::models::ListingSnapshot;
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Serialize a snapshot, pretty-printed unless `compact` is set.
pub fn render_snapshot(snapshot: &ListingSnapshot, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(snapshot)
    } else {
        serde_json::to_string_pretty(snapshot)
    }
}

/// Path of the snapshot file for a run at `scraped_at`.
///
/// The file is placed at `{json_output_dir}/{YYYY-MM-DD}/{HH-MM-SS-mmm}.json`.
pub fn snapshot_path(json_output_dir: &str, scraped_at: &DateTime<Local>) -> PathBuf {
    Path::new(json_output_dir)
        .join(scraped_at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", scraped_at.format("%H-%M-%S-%3f")))
}

/// Write a [`ListingSnapshot`] to its dated JSON file.
///
/// # Returns
///
/// The path that was written, or an error if directory creation or
/// writing fails, or a snapshot already exists at that path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(
    snapshot: &ListingSnapshot,
    json_output_dir: &str,
    scraped_at: &DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = render_snapshot(snapshot, false)?;
    let path = snapshot_path(json_output_dir, scraped_at);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
        Ok(file) => file,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Refusing to replace JSON snapshot");
            return Err(e.into());
        }
    };
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    info!(path = %path.display(), items = snapshot.items.len(), "Wrote JSON snapshot");
    Ok(path)
}
