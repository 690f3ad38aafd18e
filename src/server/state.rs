use axum::extract::FromRef;

use crate::library::{LibraryManager, SongManager};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSongManager = Arc<SongManager>;
pub type GuardedLibraryManager = Arc<LibraryManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub song_manager: GuardedSongManager,
    pub library_manager: GuardedLibraryManager,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        song_manager: GuardedSongManager,
        library_manager: GuardedLibraryManager,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            song_manager,
            library_manager,
        }
    }
}

impl FromRef<ServerState> for GuardedSongManager {
    fn from_ref(input: &ServerState) -> Self {
        input.song_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedLibraryManager {
    fn from_ref(input: &ServerState) -> Self {
        input.library_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
