//! LibraryStore trait definition.

use super::models::{LibraryCounts, LibraryFilter, NewSong, Song, SongId, Verse, VerseId};
use anyhow::Result;

/// Storage backend of the music library.
///
/// Chain mutations fail with a `ChainError` (reachable through
/// `anyhow::Error::downcast_ref`) so callers can tell missing references
/// apart from storage failures.
pub trait LibraryStore: Send + Sync {
    // =========================================================================
    // Songs
    // =========================================================================

    fn get_song(&self, id: SongId) -> Result<Option<Song>>;

    /// Id of the song called `name` performed by `group`, if any.
    fn find_song(&self, name: &str, group: &str) -> Result<Option<SongId>>;

    /// Creates the song, its group relation and its verse chain in one
    /// transaction. An existing song with the same name and group is
    /// returned unchanged.
    fn create_song(&self, song: &NewSong) -> Result<SongId>;

    /// Removes the song and its whole verse chain atomically.
    fn delete_song(&self, id: SongId) -> Result<()>;

    fn rename_song(&self, id: SongId, name: &str) -> Result<()>;

    /// Links the song to `group`, creating the group if needed.
    fn add_song_group(&self, id: SongId, group: &str) -> Result<()>;

    /// Unlinks the group with id `group_id` from the song.
    fn remove_song_group(&self, id: SongId, group_id: i64) -> Result<()>;

    // =========================================================================
    // Verses
    // =========================================================================

    /// Ordered window of the song's lyrics and the number of verses in it.
    fn read_song_text(&self, id: SongId, limit: u32, offset: u32) -> Result<(usize, Vec<Verse>)>;

    /// Inserts after `after` (which must belong to the song) or at the head.
    fn insert_verse(&self, id: SongId, after: Option<VerseId>, text: &str) -> Result<VerseId>;

    fn delete_verse(&self, id: SongId, verse_id: VerseId) -> Result<()>;

    fn change_verse_text(&self, id: SongId, verse_id: VerseId, text: &str) -> Result<()>;

    // =========================================================================
    // Library
    // =========================================================================

    fn get_library(&self, filter: &LibraryFilter) -> Result<Vec<Song>>;

    fn get_counts(&self) -> Result<LibraryCounts>;
}
