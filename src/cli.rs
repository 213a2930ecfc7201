use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use news_gallery::{import_path, Aggregator, Gallery, GalleryConfig, GalleryError};

/// Deduplicating store and queries for scraped news pictures
#[derive(Parser)]
#[command(name = "news-gallery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gallery database file (defaults to the user data directory)
    #[arg(long, env = "GALLERY_DB", global = true)]
    db: Option<PathBuf>,

    /// How long to wait on a locked database, in milliseconds
    #[arg(long, env = "GALLERY_BUSY_TIMEOUT_MS", default_value_t = 5000, global = true)]
    busy_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Import scraper output (.json / .jsonl file or folder)
    Ingest { path: PathBuf },

    /// Total number of pictures
    Count,

    /// Pictures carrying a credit (case-insensitive, `/`-separated credits)
    Credit { term: String },

    /// Picture count per credit line
    CreditsCount,

    /// Picture count per media
    MediaCount,

    /// All complete pictures, newest first
    AllById,

    /// All complete pictures, latest publication date first
    AllByDate,

    /// Distinct media
    Media,

    /// Newest pictures of every media
    LatestByMedia,

    /// Newest picture of every section
    Grouped,

    /// Add one vote to a picture
    Rate { id: i64 },
}

impl Cli {
    fn config(&self) -> GalleryConfig {
        let config = match &self.db {
            Some(path) => GalleryConfig::new(path),
            None => GalleryConfig::default(),
        };
        config.with_busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = self.config();
        let gallery = Gallery::open(&config)
            .with_context(|| format!("failed to open gallery at {}", config.db_path.display()))?;

        let output = self.command.execute(&gallery)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

impl Commands {
    fn execute(&self, gallery: &Gallery) -> anyhow::Result<Value> {
        let agg = Aggregator::new(gallery);

        let value = match self {
            Commands::Ingest { path } => serde_json::to_value(import_path(gallery, path)?)?,
            Commands::Count => Value::String(agg.total_count_message()?),
            Commands::Credit { term } => serde_json::to_value(agg.by_credit(term)?)?,
            Commands::CreditsCount => keyed(agg.count_by_credits()?)?,
            Commands::MediaCount => keyed(agg.count_by_media()?)?,
            Commands::AllById => serde_json::to_value(no_content(agg.all_by_id_desc())?)?,
            Commands::AllByDate => serde_json::to_value(no_content(agg.all_by_pub_date_desc())?)?,
            Commands::Media => json!({ "media": agg.media_list()? }),
            Commands::LatestByMedia => keyed(agg.latest_by_media()?)?,
            Commands::Grouped => keyed(agg.first_per_section()?)?,
            Commands::Rate { id } => json!({ "message": agg.increment_rating(*id)?.message() }),
        };

        Ok(value)
    }
}

/// JSON object keys must be strings; a NULL column value becomes "null"
fn keyed<V: Serialize>(map: BTreeMap<Option<String>, V>) -> anyhow::Result<Value> {
    let mut object = Map::new();
    for (key, value) in map {
        object.insert(
            key.unwrap_or_else(|| "null".to_string()),
            serde_json::to_value(value)?,
        );
    }
    Ok(Value::Object(object))
}

fn no_content<T>(result: news_gallery::Result<T>) -> anyhow::Result<T> {
    match result {
        Err(GalleryError::NotFound(reason)) => anyhow::bail!("no content: {reason}"),
        other => Ok(other?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_gallery::NewImage;

    fn seeded() -> Gallery {
        let gallery = Gallery::open_in_memory().unwrap();
        gallery
            .ingest(NewImage::new("a", "a.jpg").media("X").section_title("A").credits("Getty/AFP"))
            .unwrap();
        gallery
            .ingest(NewImage::new("b", "b.jpg").media("Y").section_title("B"))
            .unwrap();
        gallery
    }

    #[test]
    fn test_cli_parse_count() {
        let cli = Cli::try_parse_from(["news-gallery", "count"]).unwrap();
        assert_eq!(cli.command, Commands::Count);
    }

    #[test]
    fn test_cli_parse_global_db_after_subcommand() {
        let cli = Cli::try_parse_from(["news-gallery", "rate", "5", "--db", "/tmp/g.db"]).unwrap();
        assert_eq!(cli.command, Commands::Rate { id: 5 });
        assert_eq!(cli.config().db_path, PathBuf::from("/tmp/g.db"));
    }

    #[test]
    fn test_cli_parse_busy_timeout() {
        let cli = Cli::try_parse_from([
            "news-gallery",
            "--busy-timeout-ms",
            "250",
            "credit",
            "AFP",
        ])
        .unwrap();
        assert_eq!(cli.config().busy_timeout, Duration::from_millis(250));
        assert_eq!(cli.command, Commands::Credit { term: "AFP".into() });
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["news-gallery"]).is_err());
    }

    #[test]
    fn test_execute_count_and_media_count() {
        let gallery = seeded();

        let count = Commands::Count.execute(&gallery).unwrap();
        assert_eq!(count, json!("Total number of images: 2"));

        let media = Commands::MediaCount.execute(&gallery).unwrap();
        assert_eq!(media, json!({ "X": 1, "Y": 1 }));
    }

    #[test]
    fn test_execute_null_group_key() {
        let gallery = seeded();

        let credits = Commands::CreditsCount.execute(&gallery).unwrap();
        assert_eq!(credits, json!({ "Getty/AFP": 1, "null": 1 }));
    }

    #[test]
    fn test_execute_rate_messages() {
        let gallery = seeded();

        let ok = Commands::Rate { id: 1 }.execute(&gallery).unwrap();
        let missing = Commands::Rate { id: 9 }.execute(&gallery).unwrap();

        assert_eq!(ok, json!({ "message": "Vote added successfully." }));
        assert_eq!(missing, json!({ "message": "Image not found." }));
    }

    #[test]
    fn test_execute_all_by_id_on_empty_store_is_no_content() {
        let gallery = Gallery::open_in_memory().unwrap();

        let err = Commands::AllById.execute(&gallery).unwrap_err();
        assert!(err.to_string().starts_with("no content"));
    }

    #[test]
    fn test_execute_grouped() {
        let gallery = seeded();

        let grouped = Commands::Grouped.execute(&gallery).unwrap();
        assert_eq!(grouped["A"]["id"], 1);
        assert_eq!(grouped["B"]["id"], 2);
    }
}
