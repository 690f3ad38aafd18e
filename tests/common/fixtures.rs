//! Test fixtures: a seeded library database and a canned metadata service

use super::constants::*;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use music_library::library_store::{LibraryStore, NewSong, SqliteLibraryStore};
use music_library::metadata::{MetadataProvider, SongDetails};
use std::sync::Arc;
use tempfile::TempDir;

/// Metadata service that knows [`KNOWN_SONG`] and [`BAD_DATE_SONG`] only.
pub struct MockMetadata;

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn get_song_details(&self, group: &str, song: &str) -> Result<SongDetails> {
        match (group, song) {
            (KNOWN_GROUP, KNOWN_SONG) => Ok(SongDetails {
                release_date: KNOWN_RELEASE_DATE.to_string(),
                text: KNOWN_TEXT.to_string(),
                link: KNOWN_LINK.to_string(),
            }),
            (_, BAD_DATE_SONG) => Ok(SongDetails {
                release_date: "sometime in 2006".to_string(),
                text: "la".to_string(),
                link: KNOWN_LINK.to_string(),
            }),
            _ => bail!("no details for '{}' by '{}'", song, group),
        }
    }
}

/// Creates a library database holding [`SEEDED_SONGS`].
/// Returns the temp dir keeping it alive together with the open store.
pub fn create_test_store() -> Result<(TempDir, Arc<SqliteLibraryStore>)> {
    let dir = TempDir::new()?;
    let store = Arc::new(SqliteLibraryStore::new(dir.path().join("library.db"), 2)?);

    for (name, date, verses) in SEEDED_SONGS {
        store.create_song(&NewSong {
            group: SEEDED_GROUP.to_string(),
            name: name.to_string(),
            release_date: NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
            link: String::new(),
            verses: verses.iter().map(|v| v.to_string()).collect(),
        })?;
    }

    Ok((dir, store))
}
