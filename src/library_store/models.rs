use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::verse_chain::{SongAnchor, SongId, Verse, VerseId};

/// Day-first date format used on the wire (`31.12.2006`).
pub const WIRE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Storage date format (`2006-12-31`), sorts lexicographically.
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub mod wire_date {
    use super::WIRE_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(WIRE_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, WIRE_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: i64,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub name: String,
    #[serde(with = "wire_date")]
    pub release_date: NaiveDate,
    pub link: String,
    pub groups: Vec<Group>,
}

/// Everything needed to create a song together with its verse chain.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub group: String,
    pub name: String,
    pub release_date: NaiveDate,
    pub link: String,
    pub verses: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    pub limit: u32,
    pub offset: u32,
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryCounts {
    pub songs: usize,
    pub groups: usize,
    pub verses: usize,
}
