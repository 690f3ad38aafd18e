//! Music library server
//!
//! Songs, their groups and their lyrics behind an HTTP API. Lyrics are kept
//! as a linked chain of verses, see [`verse_chain`].

pub mod config;
pub mod library;
pub mod library_store;
pub mod metadata;
pub mod server;
pub mod sqlite_persistence;
pub mod verse_chain;

// Re-export commonly used types for convenience
pub use library_store::{LibraryStore, SqliteLibraryStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use verse_chain::{ChainError, SongId, VerseId};
