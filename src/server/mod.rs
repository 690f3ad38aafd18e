mod api_error;
pub mod config;
mod http_layers;
mod library_routes;
pub mod metrics;
pub mod server;
mod song_routes;
pub mod state;

pub use api_error::{ApiError, ApiResponse};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::run_server;
