//! HTTP client for the external song-metadata service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::models::SongDetails;

/// Source of release date, lyrics and link for a song that is being added.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn get_song_details(&self, group: &str, song: &str) -> Result<SongDetails>;
}

/// HTTP client for communicating with the metadata service.
pub struct MetadataClient {
    client: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    /// Create a new metadata client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the metadata service (e.g., "http://localhost:8081")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl MetadataProvider for MetadataClient {
    async fn get_song_details(&self, group: &str, song: &str) -> Result<SongDetails> {
        let url = format!("{}/info", self.base_url);
        debug!("Fetching details of '{}' by '{}' from {}", song, group, url);

        let response = self
            .client
            .get(&url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .context("Failed to connect to metadata service")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch details of '{}' by '{}': status {}",
                song,
                group,
                response.status()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse song details response")
    }
}
