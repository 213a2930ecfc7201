//! Shared data structures for the gallery store
//!
//! These structs represent the data model that flows between
//! the database layer and its callers (scraper and API).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored gallery picture
///
/// Text columns are nullable in the catalog (rows written by older scraper
/// versions may lack any of them), so every one is an `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Unique database ID, assigned on insert and never reused
    pub id: i64,
    /// Outlet the picture was scraped from
    pub media: Option<String>,
    pub section_title: Option<String>,
    /// Publication date as scraped; compared as a plain string
    pub pub_date: Option<String>,
    pub page_url: Option<String>,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub author: Option<String>,
    /// Free-form credit line, possibly several credits joined by `/`
    pub credits: Option<String>,
    /// URL or path of the image asset
    pub picture: Option<String>,
    /// Vote tally; `None` means no vote was ever recorded
    pub rates: Option<i64>,
}

impl ImageRecord {
    /// Vote tally with an unset value read as zero
    pub fn rating(&self) -> i64 {
        self.rates.unwrap_or(0)
    }
}

/// A candidate record handed over by the scraper
///
/// `caption` and `picture` form the dedup key and are required;
/// everything else may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewImage {
    pub media: Option<String>,
    pub section_title: Option<String>,
    pub pub_date: Option<String>,
    pub page_url: Option<String>,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub author: Option<String>,
    pub credits: Option<String>,
    pub picture: Option<String>,
}

impl NewImage {
    /// Create a candidate with just the dedup key set
    pub fn new(caption: impl Into<String>, picture: impl Into<String>) -> Self {
        Self {
            caption: Some(caption.into()),
            picture: Some(picture.into()),
            ..Self::default()
        }
    }

    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn section_title(mut self, section_title: impl Into<String>) -> Self {
        self.section_title = Some(section_title.into());
        self
    }

    pub fn pub_date(mut self, pub_date: impl Into<String>) -> Self {
        self.pub_date = Some(pub_date.into());
        self
    }

    pub fn credits(mut self, credits: impl Into<String>) -> Self {
        self.credits = Some(credits.into());
        self
    }
}

/// Result of one ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The stored record: freshly inserted, or the existing match
    pub record: ImageRecord,
    /// False when the dedup key was already present
    pub created: bool,
}

/// Outcome of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingResult {
    Success,
    NotFound,
}

impl RatingResult {
    /// Message shown to the front-end
    pub fn message(&self) -> &'static str {
        match self {
            RatingResult::Success => "Vote added successfully.",
            RatingResult::NotFound => "Image not found.",
        }
    }
}

/// Counts keyed by a nullable column value
pub type CountMap = BTreeMap<Option<String>, i64>;

/// Newest records per media
pub type LatestByMedia = BTreeMap<Option<String>, Vec<ImageRecord>>;

/// One representative record per section title
pub type SectionGroups = BTreeMap<Option<String>, ImageRecord>;
