use super::anchor::{insert_verse_row, SongAnchor};
use super::error::ChainResult;

use rusqlite::Connection;

/// Creates one verse per text, linked in the given order, and returns the
/// anchor to store on the new song row. An empty input creates nothing and
/// returns an empty anchor.
///
/// Verses are inserted tail first so that every `next` already exists when
/// its row is written. Run this in the same transaction as the song insert.
pub fn build_chain<S: AsRef<str>>(conn: &Connection, texts: &[S]) -> ChainResult<SongAnchor> {
    const OP: &str = "build_chain";

    let mut anchor = SongAnchor::default();
    let mut next = None;
    for text in texts.iter().rev() {
        let verse_id = insert_verse_row(conn, OP, text.as_ref(), next)?;
        if anchor.last_verse_id.is_none() {
            anchor.last_verse_id = Some(verse_id);
        }
        next = Some(verse_id);
    }
    anchor.first_verse_id = next;
    Ok(anchor)
}
