use super::anchor::{load_anchor, next_of, SongAnchor};
use super::error::{ChainError, ChainResult, InOp};
use super::{SongId, Verse, VerseId};
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// Walks the chain server side and returns the `[offset, offset + limit)`
/// window in chain order, together with the number of verses returned.
///
/// A missing song reads as an empty chain. The recursion depth is bounded by
/// the number of verse rows, so a corrupted cyclic chain terminates.
pub fn read_chain(
    conn: &Connection,
    song_id: SongId,
    limit: u32,
    offset: u32,
) -> ChainResult<(usize, Vec<Verse>)> {
    const OP: &str = "read_chain";

    let mut stmt = conn
        .prepare_cached(
            "WITH RECURSIVE chain(id, text, next, depth) AS (
                SELECT v.id, v.text, v.next, 1
                FROM songs s JOIN verses v ON v.id = s.first_verse_id
                WHERE s.id = ?1
                UNION ALL
                SELECT v.id, v.text, v.next, c.depth + 1
                FROM chain c JOIN verses v ON v.id = c.next
                WHERE c.depth < (SELECT COUNT(*) FROM verses)
            )
            SELECT id, text FROM chain ORDER BY depth LIMIT ?2 OFFSET ?3",
        )
        .in_op(OP)?;

    let verses = stmt
        .query_map(params![song_id, limit, offset], |row| {
            Ok(Verse {
                verse_id: row.get(0)?,
                text: row.get(1)?,
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .in_op(OP)?;

    Ok((verses.len(), verses))
}

/// Follows `next` from the anchor's head with point lookups and returns the
/// verse ids in chain order.
///
/// Fails with `InvariantViolation` on a half-set anchor, a cycle, a dangling
/// `next`, or a walk that does not end at the anchor's tail.
pub fn walk_chain(
    conn: &Connection,
    op: &'static str,
    anchor: &SongAnchor,
) -> ChainResult<Vec<VerseId>> {
    let (first, last) = match (anchor.first_verse_id, anchor.last_verse_id) {
        (None, None) => return Ok(Vec::new()),
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ChainError::violation(
                op,
                format!("half-set anchor {:?}", anchor),
            ))
        }
    };

    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(first);
    while let Some(verse_id) = cursor {
        if !seen.insert(verse_id) {
            return Err(ChainError::violation(
                op,
                format!("cycle through verse {}", verse_id),
            ));
        }
        cursor = match next_of(conn, op, verse_id) {
            Ok(next) => next,
            Err(ChainError::ReferenceNotFound { .. }) => {
                return Err(ChainError::violation(
                    op,
                    format!("dangling reference to verse {}", verse_id),
                ))
            }
            Err(e) => return Err(e),
        };
        ids.push(verse_id);
    }

    if ids.last() != Some(&last) {
        return Err(ChainError::violation(
            op,
            format!("chain ends at {:?}, anchor tail is {}", ids.last(), last),
        ));
    }
    Ok(ids)
}

/// Loads a song's anchor and checks its chain end to end.
pub fn verify_chain(conn: &Connection, song_id: SongId) -> ChainResult<Vec<VerseId>> {
    const OP: &str = "verify_chain";
    let anchor = load_anchor(conn, OP, song_id)?;
    walk_chain(conn, OP, &anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verse_chain::anchor::{set_last, set_next};
    use crate::verse_chain::test_support::*;

    #[test]
    fn reads_in_chain_order_not_id_order() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a", "b", "c"]);
        let chain = ids(&conn, song);

        // Chains are built tail first, so ids descend along the chain
        assert!(chain[0] > chain[2]);
        assert_eq!(texts(&conn, song), vec!["a", "b", "c"]);
    }

    #[test]
    fn pagination_windows_the_ordered_chain() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["v1", "v2", "v3", "v4", "v5"]);

        let (count, verses) = read_chain(&conn, song, 2, 2).unwrap();
        assert_eq!(count, 2);
        let texts: Vec<_> = verses.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["v3", "v4"]);

        let (count, verses) = read_chain(&conn, song, 10, 4).unwrap();
        assert_eq!(count, 1);
        assert_eq!(verses[0].text, "v5");

        let (count, verses) = read_chain(&conn, song, 10, 5).unwrap();
        assert_eq!(count, 0);
        assert!(verses.is_empty());
    }

    #[test]
    fn missing_song_and_empty_song_read_as_empty() {
        let (_dir, conn) = chain_db();
        let empty = song_with_verses(&conn, &[]);

        assert_eq!(read_chain(&conn, empty, 10, 0).unwrap(), (0, vec![]));
        assert_eq!(read_chain(&conn, SongId(404), 10, 0).unwrap(), (0, vec![]));
    }

    #[test]
    fn cyclic_chain_read_terminates() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a", "b"]);
        let chain = ids(&conn, song);
        set_next(&conn, "t", chain[1], Some(chain[0])).unwrap();

        let (count, _) = read_chain(&conn, song, u32::MAX, 0).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn walk_returns_every_verse_once_ending_at_tail() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a", "b", "c", "d"]);

        let walked = verify_chain(&conn, song).unwrap();
        assert_eq!(walked, ids(&conn, song));
        assert_eq!(walked.last().copied(), anchor(&conn, song).last_verse_id);
    }

    #[test]
    fn walk_detects_cycle() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a", "b", "c"]);
        let chain = ids(&conn, song);
        set_next(&conn, "t", chain[2], Some(chain[1])).unwrap();

        let err = verify_chain(&conn, song).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn walk_detects_wrong_tail() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a", "b", "c"]);
        let chain = ids(&conn, song);
        set_last(&conn, "t", song, Some(chain[1])).unwrap();

        let err = verify_chain(&conn, song).unwrap_err();
        assert!(matches!(err, ChainError::InvariantViolation { .. }));
    }

    #[test]
    fn walk_rejects_half_set_anchor() {
        let (_dir, conn) = chain_db();
        let song = song_with_verses(&conn, &["a"]);
        set_last(&conn, "t", song, None).unwrap();

        let err = verify_chain(&conn, song).unwrap_err();
        assert!(err.to_string().contains("half-set anchor"));
    }
}
