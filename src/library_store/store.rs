//! SQLite-backed library store.
//!
//! One write connection serialises every mutation through `BEGIN IMMEDIATE`
//! transactions, reads are spread over a small pool of connections.

use super::models::*;
use super::schema::LIBRARY_VERSIONED_SCHEMAS;
use super::trait_def::LibraryStore;
use crate::sqlite_persistence::open_versioned;
use crate::verse_chain::{self, ChainError};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

pub struct SqliteLibraryStore {
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
}

fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open library database {}", db_path.display()))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("Library database connection lock poisoned"))
}

impl SqliteLibraryStore {
    /// Opens (creating or migrating if needed) the library database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent reads
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = open_connection(db_path)?;
        open_versioned(&mut write_conn, LIBRARY_VERSIONED_SCHEMAS)
            .context("Failed to prepare library schema")?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = open_connection(db_path)?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        let store = SqliteLibraryStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        };

        let counts = store.get_counts()?;
        info!(
            "Opened music library: {} songs, {} groups, {} verses",
            counts.songs, counts.groups, counts.verses
        );
        Ok(store)
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Runs `f` inside an immediate transaction on the write connection.
    /// Any error rolls the whole transaction back.
    fn write<T>(&self, op: &'static str, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let mut conn = lock(&self.write_conn)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ChainError::from_sqlite(op, e))?;
        let value = f(&tx)?;
        tx.commit().map_err(|e| ChainError::from_sqlite(op, e))?;
        Ok(value)
    }

    /// Fails with `ReferenceNotFound` unless `verse_id` is part of the song's
    /// chain.
    fn ensure_verse_in_song(
        conn: &Connection,
        op: &'static str,
        id: SongId,
        verse_id: VerseId,
    ) -> Result<()> {
        let anchor = verse_chain::load_anchor(conn, op, id)?;
        let chain = verse_chain::walk_chain(conn, op, &anchor)?;
        if !chain.contains(&verse_id) {
            return Err(ChainError::not_found(op, format!("verse {} in song {}", verse_id, id)).into());
        }
        Ok(())
    }

    fn ensure_song_exists(conn: &Connection, op: &'static str, id: SongId) -> Result<()> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM songs WHERE id = ?1)",
            params![id],
            |r| r.get(0),
        )?;
        if !exists {
            return Err(ChainError::not_found(op, format!("song {}", id)).into());
        }
        Ok(())
    }

    fn find_song_with_conn(conn: &Connection, name: &str, group: &str) -> Result<Option<SongId>> {
        Ok(conn
            .query_row(
                "SELECT s.id FROM songs s
                 JOIN songs_groups sg ON sg.song_id = s.id
                 JOIN music_groups g ON g.id = sg.group_id
                 WHERE s.name = ?1 AND g.name = ?2
                 ORDER BY s.id LIMIT 1",
                params![name, group],
                |r| r.get(0),
            )
            .optional()?)
    }

    fn get_or_create_group(conn: &Connection, name: &str) -> Result<i64> {
        conn.execute(
            "INSERT OR IGNORE INTO music_groups (name) VALUES (?1)",
            params![name],
        )?;
        Ok(conn.query_row(
            "SELECT id FROM music_groups WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?)
    }

    fn get_song_groups(conn: &Connection, id: SongId) -> Result<Vec<Group>> {
        let mut stmt = conn.prepare_cached(
            "SELECT g.id, g.name FROM music_groups g
             JOIN songs_groups sg ON sg.group_id = g.id
             WHERE sg.song_id = ?1 ORDER BY g.id",
        )?;
        let groups = stmt
            .query_map(params![id], |row| {
                Ok(Group {
                    group_id: row.get(0)?,
                    group_name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }

    fn parse_date(row: &Row, index: usize) -> rusqlite::Result<NaiveDate> {
        let raw: String = row.get(index)?;
        NaiveDate::parse_from_str(&raw, DB_DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
    }

    fn get_song_with_conn(conn: &Connection, id: SongId) -> Result<Option<Song>> {
        let mut stmt =
            conn.prepare_cached("SELECT id, name, release_date, link FROM songs WHERE id = ?1")?;
        let song = match stmt.query_row(params![id], |row| {
            Ok(Song {
                id: row.get(0)?,
                name: row.get(1)?,
                release_date: Self::parse_date(row, 2)?,
                link: row.get(3)?,
                groups: Vec::new(),
            })
        }) {
            Ok(song) => song,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let groups = Self::get_song_groups(conn, id)?;
        Ok(Some(Song { groups, ..song }))
    }

    fn count(conn: &Connection, table: &str) -> Result<usize> {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get(0)
        })?;
        Ok(count as usize)
    }
}

/// `%term%` for a case-insensitive LIKE with `\` as escape character.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl LibraryStore for SqliteLibraryStore {
    fn get_song(&self, id: SongId) -> Result<Option<Song>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Self::get_song_with_conn(&conn, id)
    }

    fn find_song(&self, name: &str, group: &str) -> Result<Option<SongId>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Self::find_song_with_conn(&conn, name, group)
    }

    fn create_song(&self, song: &NewSong) -> Result<SongId> {
        self.write("create_song", |tx| {
            if let Some(existing) = Self::find_song_with_conn(tx, &song.name, &song.group)? {
                info!(
                    "Song '{}' by '{}' already exists with id {}",
                    song.name, song.group, existing
                );
                return Ok(existing);
            }

            let anchor = verse_chain::build_chain(tx, song.verses.as_slice())?;
            tx.execute(
                "INSERT INTO songs (name, link, release_date, first_verse_id, last_verse_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    song.name,
                    song.link,
                    song.release_date.format(DB_DATE_FORMAT).to_string(),
                    anchor.first_verse_id,
                    anchor.last_verse_id
                ],
            )?;
            let id = SongId(tx.last_insert_rowid());

            let group_id = Self::get_or_create_group(tx, &song.group)?;
            tx.execute(
                "INSERT INTO songs_groups (song_id, group_id) VALUES (?1, ?2)",
                params![id, group_id],
            )?;
            Ok(id)
        })
    }

    fn delete_song(&self, id: SongId) -> Result<()> {
        self.write("delete_song", |tx| {
            verse_chain::delete_song(tx, id)?;
            Ok(())
        })
    }

    fn rename_song(&self, id: SongId, name: &str) -> Result<()> {
        self.write("rename_song", |tx| {
            let updated = tx.execute(
                "UPDATE songs SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            if updated == 0 {
                return Err(ChainError::not_found("rename_song", format!("song {}", id)).into());
            }
            Ok(())
        })
    }

    fn add_song_group(&self, id: SongId, group: &str) -> Result<()> {
        self.write("add_song_group", |tx| {
            Self::ensure_song_exists(tx, "add_song_group", id)?;
            let group_id = Self::get_or_create_group(tx, group)?;
            tx.execute(
                "INSERT OR IGNORE INTO songs_groups (song_id, group_id) VALUES (?1, ?2)",
                params![id, group_id],
            )?;
            Ok(())
        })
    }

    fn remove_song_group(&self, id: SongId, group_id: i64) -> Result<()> {
        self.write("remove_song_group", |tx| {
            let removed = tx.execute(
                "DELETE FROM songs_groups WHERE song_id = ?1 AND group_id = ?2",
                params![id, group_id],
            )?;
            if removed == 0 {
                return Err(ChainError::not_found(
                    "remove_song_group",
                    format!("group {} of song {}", group_id, id),
                )
                .into());
            }
            Ok(())
        })
    }

    fn read_song_text(&self, id: SongId, limit: u32, offset: u32) -> Result<(usize, Vec<Verse>)> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Ok(verse_chain::read_chain(&conn, id, limit, offset)?)
    }

    fn insert_verse(&self, id: SongId, after: Option<VerseId>, text: &str) -> Result<VerseId> {
        self.write("insert_verse", |tx| {
            if let Some(reference) = after {
                Self::ensure_verse_in_song(tx, "insert_verse", id, reference)?;
            }
            Ok(verse_chain::insert_verse(tx, id, after, text)?)
        })
    }

    fn delete_verse(&self, id: SongId, verse_id: VerseId) -> Result<()> {
        self.write("delete_verse", |tx| {
            Self::ensure_verse_in_song(tx, "delete_verse", id, verse_id)?;
            Ok(verse_chain::delete_verse(tx, id, verse_id)?)
        })
    }

    fn change_verse_text(&self, id: SongId, verse_id: VerseId, text: &str) -> Result<()> {
        self.write("change_verse_text", |tx| {
            Self::ensure_verse_in_song(tx, "change_verse_text", id, verse_id)?;
            Ok(verse_chain::change_verse_text(tx, verse_id, text)?)
        })
    }

    fn get_library(&self, filter: &LibraryFilter) -> Result<Vec<Song>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;

        let date_from = filter.date_from.map(|d| d.format(DB_DATE_FORMAT).to_string());
        let date_to = filter.date_to.map(|d| d.format(DB_DATE_FORMAT).to_string());
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let mut stmt = conn.prepare_cached(
            "SELECT s.id FROM songs s
             WHERE (?1 IS NULL OR s.release_date >= ?1)
               AND (?2 IS NULL OR s.release_date <= ?2)
               AND (?3 IS NULL
                    OR lower(s.name) LIKE ?3 ESCAPE '\\'
                    OR EXISTS (
                        SELECT 1 FROM songs_groups sg
                        JOIN music_groups g ON g.id = sg.group_id
                        WHERE sg.song_id = s.id AND lower(g.name) LIKE ?3 ESCAPE '\\'))
             ORDER BY s.id LIMIT ?4 OFFSET ?5",
        )?;
        let ids = stmt
            .query_map(
                params![date_from, date_to, search, filter.limit, filter.offset],
                |row| row.get::<_, SongId>(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut songs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(song) = Self::get_song_with_conn(&conn, id)? {
                songs.push(song);
            }
        }
        Ok(songs)
    }

    fn get_counts(&self) -> Result<LibraryCounts> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Ok(LibraryCounts {
            songs: Self::count(&conn, "songs")?,
            groups: Self::count(&conn, "music_groups")?,
            verses: Self::count(&conn, "verses")?,
        })
    }
}
