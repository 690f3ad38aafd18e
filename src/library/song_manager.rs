use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::lyrics::{parse_wire_date, split_stanzas};
use super::MetadataError;
use crate::library_store::{LibraryStore, NewSong, SongId, Verse, VerseId};
use crate::metadata::MetadataProvider;
use crate::server::metrics;
use crate::verse_chain::ChainError;

/// Verse to insert after `after`, or at the head when `after` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVerse {
    pub after: Option<VerseId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseTextChange {
    pub verse_id: VerseId,
    pub text: String,
}

/// Edits applied by `SongManager::change_song`, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongChanges {
    pub name: Option<String>,
    pub new_group: Option<String>,
    /// Id of the group to unlink, as listed in the song's `groups`.
    pub group_to_delete: Option<i64>,
    pub new_verse: Option<NewVerse>,
    pub verse_text: Option<VerseTextChange>,
    pub delete_verse_id: Option<VerseId>,
}

impl SongChanges {
    pub fn is_empty(&self) -> bool {
        *self == SongChanges::default()
    }
}

pub struct SongManager {
    store: Arc<dyn LibraryStore>,
    metadata: Arc<dyn MetadataProvider>,
}

/// Counts the outcome of a chain mutation and passes the result through.
fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e
            .downcast_ref::<ChainError>()
            .map(ChainError::kind)
            .unwrap_or("error"),
    };
    metrics::record_chain_mutation(operation, outcome);
    result
}

impl SongManager {
    pub fn new(store: Arc<dyn LibraryStore>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { store, metadata }
    }

    /// Page `page` of the song's lyrics, `limit` verses per page.
    pub fn get_song_text(&self, id: SongId, limit: u32, page: u32) -> Result<(usize, Vec<Verse>)> {
        let offset = limit.saturating_mul(page);
        self.store.read_song_text(id, limit, offset)
    }

    pub fn delete_song(&self, id: SongId) -> Result<()> {
        observe("delete_song", self.store.delete_song(id))?;
        info!("Deleted song {}", id);
        self.refresh_counts();
        Ok(())
    }

    /// Applies every requested change in order and stops at the first failure.
    /// Earlier changes stay applied.
    pub fn change_song(&self, id: SongId, changes: &SongChanges) -> Result<()> {
        if let Some(name) = &changes.name {
            self.store.rename_song(id, name)?;
            info!("Renamed song {} to '{}'", id, name);
        }
        if let Some(group) = &changes.new_group {
            self.store.add_song_group(id, group)?;
            info!("Added group '{}' to song {}", group, id);
        }
        if let Some(group_id) = changes.group_to_delete {
            self.store.remove_song_group(id, group_id)?;
            info!("Removed group {} from song {}", group_id, id);
        }
        if let Some(new_verse) = &changes.new_verse {
            let verse_id = observe(
                "insert_verse",
                self.store.insert_verse(id, new_verse.after, &new_verse.text),
            )?;
            info!(
                "Inserted verse {} into song {} after {:?}",
                verse_id, id, new_verse.after
            );
        }
        if let Some(change) = &changes.verse_text {
            observe(
                "change_verse_text",
                self.store.change_verse_text(id, change.verse_id, &change.text),
            )?;
            info!("Changed text of verse {} in song {}", change.verse_id, id);
        }
        if let Some(verse_id) = changes.delete_verse_id {
            observe("delete_verse", self.store.delete_verse(id, verse_id))?;
            info!("Deleted verse {} from song {}", verse_id, id);
        }
        self.refresh_counts();
        Ok(())
    }

    /// Adds a song by `group`, fetching its details from the metadata
    /// service. A song that already exists is returned without a fetch.
    pub async fn add_song(&self, group: &str, name: &str) -> Result<SongId> {
        if let Some(existing) = self.store.find_song(name, group)? {
            info!("Song '{}' by '{}' already exists with id {}", name, group, existing);
            return Ok(existing);
        }

        let start = Instant::now();
        let details = match self.metadata.get_song_details(group, name).await {
            Ok(details) => {
                metrics::record_metadata_fetch("ok", start.elapsed());
                details
            }
            Err(e) => {
                metrics::record_metadata_fetch("error", start.elapsed());
                return Err(MetadataError::Unavailable(format!("{:#}", e)).into());
            }
        };

        let release_date = parse_wire_date(&details.release_date)
            .map_err(|e| MetadataError::Invalid(format!("{:#}", e)))?;
        let verses = split_stanzas(&details.text);

        let new_song = NewSong {
            group: group.to_string(),
            name: name.to_string(),
            release_date,
            link: details.link,
            verses,
        };
        let id = observe("create_song", self.store.create_song(&new_song))?;
        info!(
            "Added song {} '{}' by '{}' with {} verses",
            id,
            name,
            group,
            new_song.verses.len()
        );
        self.refresh_counts();
        Ok(id)
    }

    fn refresh_counts(&self) {
        match self.store.get_counts() {
            Ok(counts) => metrics::set_library_counts(&counts),
            Err(e) => warn!("Failed to refresh library counts: {:#}", e),
        }
    }
}
