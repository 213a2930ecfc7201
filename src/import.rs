//! Import of scraper output into the gallery
//!
//! The scraper drops its items as `.json` files (one object or an array of
//! objects) or `.jsonl` files (one object per line). Every item goes through
//! [`Gallery::ingest_tracked`], so re-importing a folder is harmless.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{GalleryError, Result};
use crate::state::{Gallery, NewImage};

/// Result of an import run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    /// Scraper files read
    pub files: usize,
    /// New pictures stored
    pub imported: usize,
    /// Pictures already in the catalog
    pub skipped: usize,
    /// Items or files that could not be used
    pub rejected: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Scraper output formats we know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Json,
    JsonLines,
}

impl InputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(InputFormat::Json),
            "jsonl" | "ndjson" => Some(InputFormat::JsonLines),
            _ => None,
        }
    }
}

/// Import every scraper file under `path` (a single file or a folder,
/// walked recursively).
///
/// Unreadable items are counted as rejected and skipped. A storage
/// failure aborts the run.
pub fn import_path(gallery: &Gallery, path: &Path) -> Result<ImportSummary> {
    if !path.exists() {
        return Err(GalleryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let started_at = Utc::now();
    let mut summary = ImportSummary {
        files: 0,
        imported: 0,
        skipped: 0,
        rejected: 0,
        started_at,
        finished_at: started_at,
    };

    info!("🔍 Scanning: {}", path.display());

    let files: Vec<(PathBuf, InputFormat)> = WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let format = InputFormat::from_path(e.path())?;
            Some((e.into_path(), format))
        })
        .collect();

    for (file, format) in files {
        summary.files += 1;

        let candidates = match read_candidates(&file, format) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("⚠️  Skipping {}: {}", file.display(), e);
                summary.rejected += 1;
                continue;
            }
        };

        for candidate in candidates {
            let candidate = match candidate {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!("⚠️  Bad item in {}: {}", file.display(), e);
                    summary.rejected += 1;
                    continue;
                }
            };

            match gallery.ingest_tracked(candidate) {
                Ok(outcome) if outcome.created => summary.imported += 1,
                Ok(_) => summary.skipped += 1,
                Err(GalleryError::Validation(reason)) => {
                    warn!("⚠️  Rejected item in {}: {}", file.display(), reason);
                    summary.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    summary.finished_at = Utc::now();
    info!(
        "✅ Import complete: {} new, {} skipped, {} rejected from {} files",
        summary.imported, summary.skipped, summary.rejected, summary.files
    );

    Ok(summary)
}

/// Parse one scraper file into candidates.
///
/// A file that cannot be read at all is an error; for JSON Lines each line
/// succeeds or fails on its own.
fn read_candidates(path: &Path, format: InputFormat) -> Result<Vec<Result<NewImage>>> {
    let content = fs::read_to_string(path)?;

    match format {
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&content)?;
            let items = match value {
                serde_json::Value::Array(items) => items,
                item => vec![item],
            };
            Ok(items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(GalleryError::from))
                .collect())
        }
        InputFormat::JsonLines => Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(GalleryError::from))
            .collect()),
    }
}
