/// State management module
///
/// This module handles the gallery catalog:
/// - Shared data structures (data.rs)
/// - Database connection, schema and deduplicating ingestion (gallery.rs)
/// - Read-side aggregations and the vote counter (aggregate.rs)

pub mod aggregate;
pub mod data;
pub mod gallery;

pub use aggregate::{credit_matches, Aggregator, LATEST_PER_MEDIA};
pub use data::{CountMap, ImageRecord, IngestOutcome, LatestByMedia, NewImage, RatingResult, SectionGroups};
pub use gallery::Gallery;
