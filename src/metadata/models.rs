//! Response types of the external song-metadata service.

use serde::{Deserialize, Serialize};

/// Body of `GET /info?group=..&song=..`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    /// Day-first date, e.g. `16.07.2006`
    pub release_date: String,
    /// Full lyrics, stanzas separated by blank lines
    pub text: String,
    pub link: String,
}
