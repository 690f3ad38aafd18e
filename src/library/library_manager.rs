use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::library_store::{LibraryFilter, LibraryStore, Song};

/// Filtered, paginated view over every song with its groups.
pub struct LibraryManager {
    store: Arc<dyn LibraryStore>,
}

impl LibraryManager {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Songs whose name or group contains `search` (case-insensitive) and
    /// whose release date lies within the inclusive bounds.
    pub fn get_library(
        &self,
        limit: u32,
        page: u32,
        search: Option<String>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<Song>> {
        let filter = LibraryFilter {
            limit,
            offset: limit.saturating_mul(page),
            search,
            date_from,
            date_to,
        };
        debug!("Library query {:?}", filter);
        self.store.get_library(&filter)
    }
}
