//! Service layer between the HTTP routes and the library store.

mod library_manager;
mod lyrics;
mod song_manager;

pub use library_manager::LibraryManager;
pub use lyrics::{parse_wire_date, split_stanzas};
pub use song_manager::{NewVerse, SongChanges, SongManager, VerseTextChange};

use thiserror::Error;

/// The metadata service could not provide usable details for a new song.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata unavailable: {0}")]
    Unavailable(String),

    #[error("invalid metadata: {0}")]
    Invalid(String),
}
