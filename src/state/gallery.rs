use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::data::{ImageRecord, IngestOutcome, NewImage};
use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};

/// Column list in the order `record_from_row` decodes it
pub(crate) const COLUMNS: &str =
    "id, media, sectionTitle, pubDate, pageUrl, caption, location, author, credits, picture, rates";

/// The Gallery manages the SQLite catalog of scraped pictures.
///
/// It is the one storage handle both ingestion and the aggregation queries
/// run against. A connection can move between threads but not be shared;
/// use [`Gallery::reopen`] to get another connection to the same file.
pub struct Gallery {
    conn: Connection,
    db_path: Option<PathBuf>,
    busy_timeout: Duration,
}

impl Gallery {
    /// Open (or create) the catalog described by `config` and initialize
    /// the schema.
    pub fn open(config: &GalleryConfig) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let gallery = Self::connect(&config.db_path, config.busy_timeout)?;

        // WAL lets readers proceed while the scraper is writing
        let mode: String =
            gallery
                .conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "Journal mode set");

        gallery.init_schema()?;
        info!("📁 Gallery opened at: {}", config.db_path.display());

        Ok(gallery)
    }

    /// Open a private, empty, in-memory catalog
    pub fn open_in_memory() -> Result<Self> {
        let gallery = Gallery {
            conn: Connection::open_in_memory()?,
            db_path: None,
            busy_timeout: Duration::ZERO,
        };
        gallery.init_schema()?;
        Ok(gallery)
    }

    /// Open an independent connection to the same database file.
    ///
    /// The schema is assumed to be in place already.
    pub fn reopen(&self) -> Result<Self> {
        match &self.db_path {
            Some(path) => Self::connect(path, self.busy_timeout),
            None => Err(GalleryError::Config(
                "an in-memory gallery cannot be reopened".to_string(),
            )),
        }
    }

    fn connect(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        Ok(Gallery {
            conn,
            db_path: Some(path.to_path_buf()),
            busy_timeout,
        })
    }

    /// Initialize the database schema.
    /// Creates the catalog table if it doesn't exist.
    fn init_schema(&self) -> Result<()> {
        // unique_caption_picture is the dedup check for ingestion
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS galleryTable (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                media           TEXT,
                sectionTitle    TEXT,
                pubDate         TEXT,
                pageUrl         TEXT,
                caption         TEXT,
                location        TEXT,
                author          TEXT,
                credits         TEXT,
                picture         TEXT,
                rates           INTEGER DEFAULT 0,
                CONSTRAINT unique_caption_picture UNIQUE (caption, picture)
            )",
            [],
        )?;

        // Catalogs written by the scraper before votes existed lack `rates`
        let has_rates: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('galleryTable') WHERE name = 'rates'",
            [],
            |row| row.get(0),
        )?;
        if !has_rates {
            self.conn.execute(
                "ALTER TABLE galleryTable ADD COLUMN rates INTEGER DEFAULT 0",
                [],
            )?;
            info!("Added missing rates column to galleryTable");
        }

        // Media lookups drive the carousel and the per-media counts
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_gallery_media ON galleryTable(media, id DESC)",
            [],
        )?;

        Ok(())
    }

    /// Path to the database file, `None` for an in-memory catalog
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Store a scraped picture unless its (caption, picture) pair is known.
    ///
    /// Returns the stored record: the new one, or the existing match left
    /// untouched.
    pub fn ingest(&self, candidate: NewImage) -> Result<ImageRecord> {
        self.ingest_tracked(candidate).map(|outcome| outcome.record)
    }

    /// Same as [`Gallery::ingest`], also reporting whether a row was created
    pub fn ingest_tracked(&self, candidate: NewImage) -> Result<IngestOutcome> {
        let (caption, picture) = match (&candidate.caption, &candidate.picture) {
            (Some(caption), Some(picture)) => (caption, picture),
            (None, _) => return Err(GalleryError::Validation("caption is required".into())),
            (_, None) => return Err(GalleryError::Validation("picture is required".into())),
        };

        // Try the insert and let the unique constraint decide
        let result = self.conn.execute(
            "INSERT INTO galleryTable
                (media, sectionTitle, pubDate, pageUrl, caption, location, author, credits, picture, rates)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
            params![
                candidate.media,
                candidate.section_title,
                candidate.pub_date,
                candidate.page_url,
                caption,
                candidate.location,
                candidate.author,
                candidate.credits,
                picture,
            ],
        );

        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(id, "📥 Stored new picture");

                let record = ImageRecord {
                    id,
                    media: candidate.media,
                    section_title: candidate.section_title,
                    pub_date: candidate.pub_date,
                    page_url: candidate.page_url,
                    caption: candidate.caption,
                    location: candidate.location,
                    author: candidate.author,
                    credits: candidate.credits,
                    picture: candidate.picture,
                    rates: Some(0),
                };
                Ok(IngestOutcome { record, created: true })
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                // Duplicate: hand back what is already stored
                let record = self.conn.query_row(
                    &format!("SELECT {COLUMNS} FROM galleryTable WHERE caption = ?1 AND picture = ?2"),
                    params![caption, picture],
                    record_from_row,
                )?;
                debug!(id = record.id, "Picture already stored, skipping insert");

                Ok(IngestOutcome { record, created: false })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a record by its dedup key
    pub fn find_by_key(&self, caption: &str, picture: &str) -> Result<Option<ImageRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM galleryTable WHERE caption = ?1 AND picture = ?2"),
                params![caption, picture],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Look up a record by id
    pub fn get(&self, id: i64) -> Result<Option<ImageRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM galleryTable WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }
}

/// Decode a row selected with [`COLUMNS`]
pub(crate) fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        media: row.get(1)?,
        section_title: row.get(2)?,
        pub_date: row.get(3)?,
        page_url: row.get(4)?,
        caption: row.get(5)?,
        location: row.get(6)?,
        author: row.get(7)?,
        credits: row.get(8)?,
        picture: row.get(9)?,
        rates: row.get(10)?,
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("db_path", &self.db_path)
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}
