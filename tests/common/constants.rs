//! Shared constants for end-to-end tests
//!
//! When the mock metadata catalog or the seeded library changes,
//! update only this file.

// ============================================================================
// Mock metadata catalog
// ============================================================================

/// Group known to the mock metadata service
pub const KNOWN_GROUP: &str = "Muse";

/// Song known to the mock metadata service
pub const KNOWN_SONG: &str = "Supermassive Black Hole";

/// Release date the mock metadata service reports for the known song
pub const KNOWN_RELEASE_DATE: &str = "16.07.2006";

pub const KNOWN_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";

/// Lyrics of the known song, three stanzas
pub const KNOWN_TEXT: &str = "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\nYou caught me under false pretenses\nHow long before you let me go?\n\nOoh\nYou set my soul alight";

pub const KNOWN_VERSE_COUNT: usize = 3;

/// Song whose metadata carries a malformed release date
pub const BAD_DATE_SONG: &str = "Broken Date";

// ============================================================================
// Seeded library
// ============================================================================

/// Group of the songs seeded directly into the store
pub const SEEDED_GROUP: &str = "The Seeds";

/// Seeded songs, oldest first: (name, release date yyyy-mm-dd, verses)
pub const SEEDED_SONGS: &[(&str, &str, &[&str])] = &[
    ("Spring Song", "2001-03-21", &["sprout", "bloom"]),
    ("Summer Song", "2005-06-21", &["sun"]),
    ("Autumn Song", "2010-09-23", &["leaves", "rain", "wind"]),
];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between server readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Default timeout for HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
