mod client;
mod models;

pub use client::{MetadataClient, MetadataProvider};
pub use models::SongDetails;
