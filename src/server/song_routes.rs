use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use super::api_error::{ApiError, ApiResponse, ApiResult};
use super::state::{GuardedSongManager, ServerState};
use crate::library::{NewVerse, SongChanges, VerseTextChange};
use crate::library_store::{SongId, Verse, VerseId};

pub const DEFAULT_TEXT_LIMIT: u32 = 1;

#[derive(Deserialize, Debug)]
struct AddSongBody {
    group: String,
    song: String,
}

#[derive(Serialize)]
struct AddSongPayload {
    id: SongId,
}

#[derive(Serialize)]
struct SongTextPayload {
    count: usize,
    text: Vec<Verse>,
}

/// Parses `name` from the query, falling back to `default` when absent.
pub(super) fn number_param<T: FromStr>(
    params: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ApiError> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ApiError::not_a_number(name)),
    }
}

/// Like [`number_param`] without a default. An empty value counts as absent.
fn optional_number_param<T: FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ApiError> {
    params
        .get(name)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| raw.trim().parse().map_err(|_| ApiError::not_a_number(name)))
        .transpose()
}

fn parse_song_id(raw: &str) -> Result<SongId, ApiError> {
    raw.trim()
        .parse()
        .map(SongId)
        .map_err(|_| ApiError::not_a_number("id"))
}

/// Builds the change set from the PUT query. Empty values count as absent.
/// A verse is inserted only when `newVersePrevId` is given, `0` meaning the
/// head of the chain. Texts without their verse id are ignored.
fn parse_song_changes(params: &HashMap<String, String>) -> Result<SongChanges, ApiError> {
    let non_empty = |name: &str| params.get(name).filter(|v| !v.is_empty()).cloned();

    let new_verse_prev_id: Option<i64> = optional_number_param(params, "newVersePrevId")?;
    let new_verse = match (new_verse_prev_id, non_empty("newVerseText")) {
        (Some(prev_id), Some(text)) => Some(NewVerse {
            after: (prev_id != 0).then_some(VerseId(prev_id)),
            text,
        }),
        (Some(_), None) => return Err(ApiError::bad_request("newVerseText is required")),
        (None, _) => None,
    };

    let verse_id: Option<i64> = optional_number_param(params, "verseId")?;
    let verse_text = match (verse_id, params.get("verseText")) {
        (Some(verse_id), Some(text)) => Some(VerseTextChange {
            verse_id: VerseId(verse_id),
            text: text.clone(),
        }),
        (Some(_), None) => return Err(ApiError::bad_request("verseText is required")),
        (None, _) => None,
    };

    Ok(SongChanges {
        name: non_empty("name"),
        new_group: non_empty("newGroup"),
        group_to_delete: optional_number_param(params, "groupToDelete")?,
        new_verse,
        verse_text,
        delete_verse_id: optional_number_param(params, "deleteVerseId")?.map(VerseId),
    })
}

async fn add_song(
    State(song_manager): State<GuardedSongManager>,
    body: Result<Json<AddSongBody>, JsonRejection>,
) -> ApiResult<AddSongPayload> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    if body.group.trim().is_empty() || body.song.trim().is_empty() {
        return Err(ApiError::bad_request("group and song are required"));
    }

    let id = song_manager.add_song(body.group.trim(), body.song.trim()).await?;
    Ok(ApiResponse::ok(AddSongPayload { id }))
}

async fn get_song_text(
    State(song_manager): State<GuardedSongManager>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<SongTextPayload> {
    let id = parse_song_id(&id)?;
    let limit = number_param(&params, "limit", DEFAULT_TEXT_LIMIT)?;
    let page = number_param(&params, "page", 0u32)?;

    let (count, text) = song_manager.get_song_text(id, limit, page)?;
    Ok(ApiResponse::ok(SongTextPayload { count, text }))
}

async fn delete_song(
    State(song_manager): State<GuardedSongManager>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_song_id(&id)?;
    song_manager.delete_song(id)?;
    Ok(ApiResponse::ok(()))
}

async fn change_song(
    State(song_manager): State<GuardedSongManager>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<()> {
    let id = parse_song_id(&id)?;
    let changes = parse_song_changes(&params)?;
    if changes.is_empty() {
        debug!("No changes requested for song {}", id);
    }
    song_manager.change_song(id, &changes)?;
    Ok(ApiResponse::ok(()))
}

pub fn make_song_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", post(add_song))
        .route("/{id}", axum::routing::delete(delete_song).put(change_song))
        .route("/{id}/text", get(get_song_text))
        .with_state(state)
}
