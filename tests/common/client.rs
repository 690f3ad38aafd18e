//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    /// POST /song
    pub async fn add_song(&self, group: &str, song: &str) -> Response {
        self.client
            .post(format!("{}/song", self.base_url))
            .json(&json!({ "group": group, "song": song }))
            .send()
            .await
            .expect("Add song request failed")
    }

    /// POST /song, returning the id of the created (or existing) song
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer 200.
    pub async fn add_song_id(&self, group: &str, song: &str) -> i64 {
        let response = self.add_song(group, song).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["payload"]["id"].as_i64().expect("Missing song id")
    }

    /// GET /song/{id}/text with raw query parameters
    pub async fn get_text_with(&self, id: &str, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/song/{}/text", self.base_url, id))
            .query(query)
            .send()
            .await
            .expect("Get text request failed")
    }

    /// GET /song/{id}/text
    pub async fn get_text(&self, id: i64, limit: u32, page: u32) -> Response {
        let (limit, page) = (limit.to_string(), page.to_string());
        self.get_text_with(
            &id.to_string(),
            &[("limit", limit.as_str()), ("page", page.as_str())],
        )
        .await
    }

    /// All verses of a song as (verseId, text) pairs, in chain order
    pub async fn get_verses(&self, id: i64) -> Vec<(i64, String)> {
        let response = self.get_text(id, 1000, 0).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["payload"]["text"]
            .as_array()
            .expect("Missing text array")
            .iter()
            .map(|v| {
                (
                    v["verseId"].as_i64().expect("Missing verseId"),
                    v["text"].as_str().expect("Missing text").to_string(),
                )
            })
            .collect()
    }

    /// DELETE /song/{id}
    pub async fn delete_song(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/song/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete song request failed")
    }

    /// PUT /song/{id} with the change set as query parameters
    pub async fn change_song(&self, id: &str, query: &[(&str, &str)]) -> Response {
        self.client
            .put(format!("{}/song/{}", self.base_url, id))
            .query(query)
            .send()
            .await
            .expect("Change song request failed")
    }

    // ========================================================================
    // Library Endpoints
    // ========================================================================

    /// GET /library
    pub async fn get_library(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/library", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Get library request failed")
    }

    /// Names of the songs returned by GET /library, in order
    pub async fn get_library_names(&self, query: &[(&str, &str)]) -> Vec<String> {
        let response = self.get_library(query).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["payload"]["library"]
            .as_array()
            .expect("Missing library array")
            .iter()
            .map(|s| s["name"].as_str().expect("Missing name").to_string())
            .collect()
    }
}
