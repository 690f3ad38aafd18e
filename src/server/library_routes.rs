use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::api_error::{ApiError, ApiResponse, ApiResult};
use super::song_routes::number_param;
use super::state::{GuardedLibraryManager, ServerState};
use crate::library::parse_wire_date;
use crate::library_store::Song;

pub const DEFAULT_LIBRARY_LIMIT: u32 = 10;

#[derive(Serialize)]
struct LibraryPayload {
    count: usize,
    library: Vec<Song>,
}

fn date_param(params: &HashMap<String, String>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    match params.get(name).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_wire_date(raw)
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("{} is not a date (dd.mm.yyyy)", name))),
    }
}

async fn get_library(
    State(library_manager): State<GuardedLibraryManager>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<LibraryPayload> {
    let limit = number_param(&params, "limit", DEFAULT_LIBRARY_LIMIT)?;
    let page = number_param(&params, "page", 0u32)?;
    let date_from = date_param(&params, "dateFrom")?;
    let date_to = date_param(&params, "dateTo")?;
    let search = params.get("search").filter(|s| !s.is_empty()).cloned();

    let library = library_manager.get_library(limit, page, search, date_from, date_to)?;
    Ok(ApiResponse::ok(LibraryPayload {
        count: library.len(),
        library,
    }))
}

pub fn make_library_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(get_library))
        .with_state(state)
}
