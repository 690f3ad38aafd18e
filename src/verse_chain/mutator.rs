use super::anchor::{
    delete_verse_row, insert_verse_row, load_anchor, next_of, predecessor_of, set_anchor,
    set_first, set_last, set_next, SongAnchor,
};
use super::error::{ChainError, ChainResult, InOp};
use super::reader::walk_chain;
use super::{SongId, VerseId};
use rusqlite::{params, Connection};
use tracing::debug;

/// Inserts `text` immediately after `after`, or as the new head when `after`
/// is `None`, and returns the new verse id.
///
/// Precondition: `after` belongs to `song_id`'s chain. Only its existence is
/// checked here; membership is the caller's responsibility.
pub fn insert_verse(
    conn: &Connection,
    song_id: SongId,
    after: Option<VerseId>,
    text: &str,
) -> ChainResult<VerseId> {
    const OP: &str = "insert_verse";

    let anchor = load_anchor(conn, OP, song_id)?;
    let successor = match after {
        None => anchor.first_verse_id,
        Some(reference) => next_of(conn, OP, reference)?,
    };

    let verse_id = insert_verse_row(conn, OP, text, successor)?;

    if successor.is_none() {
        set_last(conn, OP, song_id, Some(verse_id))?;
    }
    match after {
        None => set_first(conn, OP, song_id, Some(verse_id))?,
        Some(reference) => set_next(conn, OP, reference, Some(verse_id))?,
    }

    debug!(
        "Inserted verse {} into song {} after {:?}",
        verse_id, song_id, after
    );
    Ok(verse_id)
}

/// Unlinks `verse_id` from `song_id`'s chain and deletes it. Neighbour and
/// anchor pointers are repaired before the row goes away.
pub fn delete_verse(conn: &Connection, song_id: SongId, verse_id: VerseId) -> ChainResult<()> {
    const OP: &str = "delete_verse";

    let successor = next_of(conn, OP, verse_id)?;
    let predecessor = predecessor_of(conn, OP, verse_id)?;

    match (predecessor, successor) {
        // Sole verse
        (None, None) => set_anchor(conn, OP, song_id, SongAnchor::default())?,
        // Tail
        (Some(predecessor), None) => {
            set_next(conn, OP, predecessor, None)?;
            set_last(conn, OP, song_id, Some(predecessor))?;
        }
        // Head
        (None, Some(successor)) => set_first(conn, OP, song_id, Some(successor))?,
        // Interior
        (Some(predecessor), Some(successor)) => set_next(conn, OP, predecessor, Some(successor))?,
    }

    delete_verse_row(conn, OP, verse_id)?;
    debug!("Deleted verse {} from song {}", verse_id, song_id);
    Ok(())
}

/// Deletes the song row and every verse of its chain. Returns the number of
/// verses removed.
pub fn delete_song(conn: &Connection, song_id: SongId) -> ChainResult<usize> {
    const OP: &str = "delete_song";

    let anchor = load_anchor(conn, OP, song_id)?;
    let chain = walk_chain(conn, OP, &anchor)?;

    conn.execute("DELETE FROM songs WHERE id = ?1", params![song_id])
        .in_op(OP)?;

    // Head first: each deleted verse is the only one referencing the next
    for verse_id in &chain {
        delete_verse_row(conn, OP, *verse_id)?;
    }

    debug!("Deleted song {} with {} verses", song_id, chain.len());
    Ok(chain.len())
}

/// Replaces a verse's text. The chain topology is untouched.
pub fn change_verse_text(conn: &Connection, verse_id: VerseId, text: &str) -> ChainResult<()> {
    const OP: &str = "change_verse_text";

    let updated = conn
        .execute(
            "UPDATE verses SET text = ?1 WHERE id = ?2",
            params![text, verse_id],
        )
        .in_op(OP)?;
    if updated == 0 {
        return Err(ChainError::not_found(OP, format!("verse {}", verse_id)));
    }
    Ok(())
}
