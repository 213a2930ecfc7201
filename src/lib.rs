//! Deduplicating store for scraped news pictures.
//!
//! The scraper hands over one [`NewImage`] at a time to [`Gallery::ingest`];
//! a picture already known by its (caption, picture) pair is never stored
//! twice. [`Aggregator`] serves the read-side views of the front-end (counts,
//! groupings, newest pictures per media) and the vote counter.
//!
//! ```rust,no_run
//! use news_gallery::{Aggregator, Gallery, GalleryConfig, NewImage};
//!
//! fn main() -> news_gallery::Result<()> {
//!     let gallery = Gallery::open(&GalleryConfig::new("gallery.db"))?;
//!     gallery.ingest(NewImage::new("A bridge at dawn", "https://img.example/1.jpg"))?;
//!
//!     let latest = Aggregator::new(&gallery).latest_by_media()?;
//!     println!("{} media", latest.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod state;

pub use config::GalleryConfig;
pub use error::{GalleryError, Result};
pub use import::{import_path, ImportSummary};
pub use state::{
    Aggregator, CountMap, Gallery, ImageRecord, IngestOutcome, LatestByMedia, NewImage,
    RatingResult, SectionGroups,
};
