//! Song lyrics stored as a singly linked list of `verses` rows.
//!
//! Each verse points to its successor through `verses.next`, the owning song
//! holds the head and tail in `songs.first_verse_id` / `songs.last_verse_id`.
//! Every function here works on a borrowed connection and never opens or
//! commits a transaction: callers run them inside one transaction per
//! logical operation so that pointer rewiring is applied atomically.

mod anchor;
mod bootstrap;
mod error;
mod mutator;
mod reader;

pub use anchor::{load_anchor, SongAnchor};
pub use bootstrap::build_chain;
pub use error::{ChainError, ChainResult};
pub use mutator::{change_verse_text, delete_song, delete_verse, insert_verse};
pub use reader::{read_chain, verify_chain, walk_chain};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

row_id!(SongId);
row_id!(VerseId);

/// One stanza of a song, as returned by the chain reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub verse_id: VerseId,
    pub text: String,
}
