//! SQLite schema of the music library.
//!
//! Lyrics live in `verses` as a singly linked list, the song row holds the
//! head and tail of its chain. Groups are shared between songs through the
//! `songs_groups` relation.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const VERSE_FK: ForeignKey = ForeignKey {
    foreign_table: "verses",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: "songs",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GROUP_FK: ForeignKey = ForeignKey {
    foreign_table: "music_groups",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// One stanza per row, `next` is the successor in its song's chain
const VERSES_TABLE: Table = Table {
    name: "verses",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("text", &SqlType::Text, non_null = true),
        sqlite_column!("next", &SqlType::Integer, foreign_key = Some(&VERSE_FK)),
    ],
    indices: &[("idx_verses_next", "next")],
    unique_constraints: &[],
};

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("link", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text, non_null = true), // YYYY-MM-DD
        sqlite_column!(
            "first_verse_id",
            &SqlType::Integer,
            foreign_key = Some(&VERSE_FK)
        ),
        sqlite_column!(
            "last_verse_id",
            &SqlType::Integer,
            foreign_key = Some(&VERSE_FK)
        ),
    ],
    indices: &[("idx_songs_name", "name")],
    unique_constraints: &[],
};

const GROUPS_TABLE: Table = Table {
    name: "music_groups",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const SONGS_GROUPS_TABLE: Table = Table {
    name: "songs_groups",
    columns: &[
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!(
            "group_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&GROUP_FK)
        ),
    ],
    indices: &[("idx_songs_groups_group", "group_id")],
    unique_constraints: &[&["song_id", "group_id"]],
};

pub const LIBRARY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[VERSES_TABLE, SONGS_TABLE, GROUPS_TABLE, SONGS_GROUPS_TABLE],
    migration: None,
}];
