//! Store configuration
//!
//! Where the catalog lives and how long a connection waits on a lock held
//! by another connection before giving up.

use std::path::PathBuf;
use std::time::Duration;

/// Default wait for a locked database before a call fails
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Path to the SQLite file
    pub db_path: PathBuf,
    /// How long a statement waits on another connection's lock
    pub busy_timeout: Duration,
}

impl GalleryConfig {
    /// Configuration for a database at an explicit path
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Get the path where the database should be stored by default
    ///
    /// - Linux: ~/.local/share/news-gallery/gallery.db
    /// - macOS: ~/Library/Application Support/news-gallery/gallery.db
    /// - Windows: %APPDATA%\news-gallery\gallery.db
    ///
    /// Falls back to the home directory, then the working directory.
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("news-gallery");
        path.push("gallery.db");
        path
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self::new(Self::default_db_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_ends_with_gallery_db() {
        let config = GalleryConfig::default();
        assert!(config.db_path.ends_with("news-gallery/gallery.db"));
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn test_with_busy_timeout() {
        let config = GalleryConfig::new("/tmp/x.db").with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }
}
