use super::error::{ChainError, ChainResult, InOp};
use super::{SongId, VerseId};
use rusqlite::{params, Connection, OptionalExtension};

/// Head and tail of a song's chain. Both are `None` exactly when the song
/// has no verses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SongAnchor {
    pub first_verse_id: Option<VerseId>,
    pub last_verse_id: Option<VerseId>,
}

impl SongAnchor {
    pub fn single(verse_id: VerseId) -> Self {
        SongAnchor {
            first_verse_id: Some(verse_id),
            last_verse_id: Some(verse_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_verse_id.is_none() && self.last_verse_id.is_none()
    }
}

pub fn load_anchor(conn: &Connection, op: &'static str, song_id: SongId) -> ChainResult<SongAnchor> {
    conn.prepare_cached("SELECT first_verse_id, last_verse_id FROM songs WHERE id = ?1")
        .and_then(|mut stmt| {
            stmt.query_row(params![song_id], |row| {
                Ok(SongAnchor {
                    first_verse_id: row.get(0)?,
                    last_verse_id: row.get(1)?,
                })
            })
            .optional()
        })
        .in_op(op)?
        .ok_or_else(|| ChainError::not_found(op, format!("song {}", song_id)))
}

pub(crate) fn set_anchor(
    conn: &Connection,
    op: &'static str,
    song_id: SongId,
    anchor: SongAnchor,
) -> ChainResult<()> {
    let updated = conn
        .execute(
            "UPDATE songs SET first_verse_id = ?1, last_verse_id = ?2 WHERE id = ?3",
            params![anchor.first_verse_id, anchor.last_verse_id, song_id],
        )
        .in_op(op)?;
    expect_one_row(op, updated, || format!("song {}", song_id))
}

pub(crate) fn set_first(
    conn: &Connection,
    op: &'static str,
    song_id: SongId,
    first: Option<VerseId>,
) -> ChainResult<()> {
    let updated = conn
        .execute(
            "UPDATE songs SET first_verse_id = ?1 WHERE id = ?2",
            params![first, song_id],
        )
        .in_op(op)?;
    expect_one_row(op, updated, || format!("song {}", song_id))
}

pub(crate) fn set_last(
    conn: &Connection,
    op: &'static str,
    song_id: SongId,
    last: Option<VerseId>,
) -> ChainResult<()> {
    let updated = conn
        .execute(
            "UPDATE songs SET last_verse_id = ?1 WHERE id = ?2",
            params![last, song_id],
        )
        .in_op(op)?;
    expect_one_row(op, updated, || format!("song {}", song_id))
}

/// Successor of `verse_id`, failing with `ReferenceNotFound` when the verse
/// itself does not exist.
pub(crate) fn next_of(
    conn: &Connection,
    op: &'static str,
    verse_id: VerseId,
) -> ChainResult<Option<VerseId>> {
    conn.prepare_cached("SELECT next FROM verses WHERE id = ?1")
        .and_then(|mut stmt| {
            stmt.query_row(params![verse_id], |row| row.get::<_, Option<VerseId>>(0))
                .optional()
        })
        .in_op(op)?
        .ok_or_else(|| ChainError::not_found(op, format!("verse {}", verse_id)))
}

pub(crate) fn set_next(
    conn: &Connection,
    op: &'static str,
    verse_id: VerseId,
    next: Option<VerseId>,
) -> ChainResult<()> {
    let updated = conn
        .execute(
            "UPDATE verses SET next = ?1 WHERE id = ?2",
            params![next, verse_id],
        )
        .in_op(op)?;
    expect_one_row(op, updated, || format!("verse {}", verse_id))
}

/// The verse whose `next` is `verse_id`. There is no stored back pointer,
/// the lookup relies on `idx_verses_next`.
pub(crate) fn predecessor_of(
    conn: &Connection,
    op: &'static str,
    verse_id: VerseId,
) -> ChainResult<Option<VerseId>> {
    let mut stmt = conn
        .prepare_cached("SELECT id FROM verses WHERE next = ?1")
        .in_op(op)?;
    let predecessors = stmt
        .query_map(params![verse_id], |row| row.get::<_, VerseId>(0))
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .in_op(op)?;

    match predecessors.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        _ => Err(ChainError::violation(
            op,
            format!("verse {} has {} predecessors", verse_id, predecessors.len()),
        )),
    }
}

pub(crate) fn insert_verse_row(
    conn: &Connection,
    op: &'static str,
    text: &str,
    next: Option<VerseId>,
) -> ChainResult<VerseId> {
    conn.execute(
        "INSERT INTO verses (text, next) VALUES (?1, ?2)",
        params![text, next],
    )
    .in_op(op)?;
    Ok(VerseId(conn.last_insert_rowid()))
}

pub(crate) fn delete_verse_row(
    conn: &Connection,
    op: &'static str,
    verse_id: VerseId,
) -> ChainResult<()> {
    let deleted = conn
        .execute("DELETE FROM verses WHERE id = ?1", params![verse_id])
        .in_op(op)?;
    expect_one_row(op, deleted, || format!("verse {}", verse_id))
}

fn expect_one_row(op: &'static str, changed: usize, what: impl FnOnce() -> String) -> ChainResult<()> {
    if changed == 0 {
        return Err(ChainError::not_found(op, what()));
    }
    Ok(())
}
