//! Read-side queries over the gallery catalog, plus the vote counter

use rusqlite::params;
use std::collections::BTreeMap;
use tracing::debug;

use super::data::{CountMap, ImageRecord, LatestByMedia, RatingResult, SectionGroups};
use super::gallery::{record_from_row, Gallery, COLUMNS};
use crate::error::{GalleryError, Result};

/// How many pictures the per-media carousel shows
pub const LATEST_PER_MEDIA: usize = 5;

/// Separator between credits in a multi-credit line
const CREDIT_SEPARATOR: char = '/';

/// Aggregation queries over a borrowed [`Gallery`]
///
/// Nothing is cached: every call reads the committed state of the catalog.
pub struct Aggregator<'g> {
    gallery: &'g Gallery,
}

impl<'g> Aggregator<'g> {
    pub fn new(gallery: &'g Gallery) -> Self {
        Self { gallery }
    }

    /// Number of stored records
    pub fn total_count(&self) -> Result<i64> {
        let count: i64 =
            self.gallery
                .conn()
                .query_row("SELECT COUNT(*) FROM galleryTable", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Front-end banner text for the total count
    pub fn total_count_message(&self) -> Result<String> {
        Ok(format!("Total number of images: {}", self.total_count()?))
    }

    /// Records whose credit line contains `term` as a whole `/`-separated
    /// credit, ignoring case
    pub fn by_credit(&self, term: &str) -> Result<Vec<ImageRecord>> {
        let records = self.select(&format!(
            "SELECT {COLUMNS} FROM galleryTable WHERE credits IS NOT NULL ORDER BY id"
        ))?;

        let matching: Vec<ImageRecord> = records
            .into_iter()
            .filter(|record| {
                record
                    .credits
                    .as_deref()
                    .is_some_and(|credits| credit_matches(credits, term))
            })
            .collect();

        debug!(term, matches = matching.len(), "Credit search");
        Ok(matching)
    }

    /// Record count per distinct credit line, taken as a whole string
    pub fn count_by_credits(&self) -> Result<CountMap> {
        self.count_by("credits")
    }

    /// Record count per media
    pub fn count_by_media(&self) -> Result<CountMap> {
        self.count_by("media")
    }

    /// Every complete record, newest id first
    ///
    /// Fails with `NotFound` when no record has both caption and picture.
    pub fn all_by_id_desc(&self) -> Result<Vec<ImageRecord>> {
        let records = self.select(&format!(
            "SELECT {COLUMNS} FROM galleryTable
             WHERE caption IS NOT NULL AND picture IS NOT NULL
             ORDER BY id DESC"
        ))?;
        non_empty(records)
    }

    /// Every complete record, latest `pubDate` first
    ///
    /// Dates are compared as plain strings. Equal dates keep insertion
    /// order and missing dates come last.
    pub fn all_by_pub_date_desc(&self) -> Result<Vec<ImageRecord>> {
        let records = self.select(&format!(
            "SELECT {COLUMNS} FROM galleryTable
             WHERE caption IS NOT NULL AND picture IS NOT NULL
             ORDER BY pubDate DESC, id ASC"
        ))?;
        non_empty(records)
    }

    /// Distinct media values, in no particular order
    pub fn media_list(&self) -> Result<Vec<Option<String>>> {
        let mut stmt = self
            .gallery
            .conn()
            .prepare("SELECT DISTINCT media FROM galleryTable")?;
        let media = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<Option<String>>>>()?;
        Ok(media)
    }

    /// The newest pictures of each media for the carousel
    ///
    /// The newest [`LATEST_PER_MEDIA`] rows are taken first and rows
    /// without a picture are dropped afterwards, so a media may come back
    /// with a shorter or empty list.
    pub fn latest_by_media(&self) -> Result<LatestByMedia> {
        let conn = self.gallery.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM galleryTable WHERE media IS ?1 ORDER BY id DESC LIMIT ?2"
        ))?;

        let mut latest = BTreeMap::new();
        for media in self.media_list()? {
            let images: Vec<ImageRecord> = stmt
                .query_map(params![media, LATEST_PER_MEDIA as i64], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?
                .into_iter()
                .filter(|record| record.picture.is_some())
                .collect();
            latest.insert(media, images);
        }

        Ok(latest)
    }

    /// One representative record per section title: the one with the
    /// highest id
    pub fn first_per_section(&self) -> Result<SectionGroups> {
        let records = self.select(&format!(
            "SELECT {COLUMNS} FROM galleryTable ORDER BY id DESC"
        ))?;

        // Scanning newest first, the first record seen for a section wins
        let mut groups = BTreeMap::new();
        for record in records {
            groups
                .entry(record.section_title.clone())
                .or_insert(record);
        }

        Ok(groups)
    }

    /// Add one vote to a record
    ///
    /// A single UPDATE, so concurrent votes on the same record are never
    /// lost. An unset tally counts as zero.
    pub fn increment_rating(&self, id: i64) -> Result<RatingResult> {
        let changed = self.gallery.conn().execute(
            "UPDATE galleryTable SET rates = COALESCE(rates, 0) + 1 WHERE id = ?1",
            params![id],
        )?;

        if changed == 0 {
            debug!(id, "Vote for unknown picture");
            return Ok(RatingResult::NotFound);
        }

        debug!(id, "👍 Vote added");
        Ok(RatingResult::Success)
    }

    fn count_by(&self, column: &str) -> Result<CountMap> {
        let mut stmt = self.gallery.conn().prepare(&format!(
            "SELECT {column}, COUNT(id) FROM galleryTable GROUP BY {column}"
        ))?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<CountMap>>()?;
        Ok(counts)
    }

    fn select(&self, sql: &str) -> Result<Vec<ImageRecord>> {
        let mut stmt = self.gallery.conn().prepare(sql)?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// Case-insensitive match of one credit inside a `/`-separated credit line
///
/// Whitespace around separators is significant: "Getty / AFP" does not
/// contain the credit "AFP".
pub fn credit_matches(credits: &str, term: &str) -> bool {
    let credits = credits.to_lowercase();
    let term = term.to_lowercase();

    credits == term
        || credits.starts_with(&format!("{term}{CREDIT_SEPARATOR}"))
        || credits.ends_with(&format!("{CREDIT_SEPARATOR}{term}"))
        || credits.contains(&format!("{CREDIT_SEPARATOR}{term}{CREDIT_SEPARATOR}"))
}

fn non_empty(records: Vec<ImageRecord>) -> Result<Vec<ImageRecord>> {
    if records.is_empty() {
        return Err(GalleryError::NotFound("no image available".to_string()));
    }
    Ok(records)
}
