//! Error types for the gallery store
//!
//! Every failure the core can produce is a distinct variant so callers
//! (the scraper pipeline, the API layer) can map them to their own
//! responses. Duplicate ingestion is not an error and never shows up here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    /// A candidate record is missing a field of the dedup key
    #[error("validation error: {0}")]
    Validation(String),

    /// A query found no qualifying records
    #[error("not found: {0}")]
    NotFound(String),

    /// The SQLite layer failed (disk, lock, connection)
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Scraped input could not be decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl GalleryError {
    /// True for the "no content" outcome of the ordered listings
    pub fn is_not_found(&self) -> bool {
        matches!(self, GalleryError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GalleryError::Validation(_))
    }
}

/// Result type alias for the gallery store
pub type Result<T> = std::result::Result<T, GalleryError>;
