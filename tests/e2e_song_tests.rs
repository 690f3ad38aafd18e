//! End-to-end tests for song endpoints
//!
//! Adding songs through the metadata service, reading their text and
//! deleting them.

mod common;

use common::{
    TestClient, TestServer, BAD_DATE_SONG, KNOWN_GROUP, KNOWN_LINK, KNOWN_SONG,
    KNOWN_VERSE_COUNT, SEEDED_SONGS,
};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_home_reports_version() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_add_song_splits_lyrics_into_verses() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.add_song(KNOWN_GROUP, KNOWN_SONG).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "ok");
    let id = body["payload"]["id"].as_i64().unwrap();

    let verses = client.get_verses(id).await;
    assert_eq!(verses.len(), KNOWN_VERSE_COUNT);
    assert!(verses[0].1.starts_with("Ooh baby, don't you know"));
    assert_eq!(verses[2].1, "Ooh\nYou set my soul alight");

    let names = client
        .get_library_names(&[("search", "supermassive")])
        .await;
    assert_eq!(names, vec![KNOWN_SONG.to_string()]);
}

#[tokio::test]
async fn test_add_song_reports_metadata_in_library() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.add_song_id(KNOWN_GROUP, KNOWN_SONG).await;

    let response = client.get_library(&[("search", KNOWN_GROUP)]).await;
    let body: Value = response.json().await.unwrap();
    let song = &body["payload"]["library"][0];
    assert_eq!(song["releaseDate"], "16.07.2006");
    assert_eq!(song["link"], KNOWN_LINK);
    assert_eq!(song["groups"][0]["groupName"], KNOWN_GROUP);
}

#[tokio::test]
async fn test_adding_same_song_twice_returns_same_id() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let first = client.add_song_id(KNOWN_GROUP, KNOWN_SONG).await;
    let second = client.add_song_id(KNOWN_GROUP, KNOWN_SONG).await;

    assert_eq!(first, second);
    assert_eq!(client.get_verses(first).await.len(), KNOWN_VERSE_COUNT);
}

#[tokio::test]
async fn test_add_song_with_unknown_metadata_is_bad_gateway() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.add_song("Nobody", "Nothing").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = client.add_song(KNOWN_GROUP, BAD_DATE_SONG).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let names = client.get_library_names(&[("limit", "100")]).await;
    assert_eq!(names.len(), SEEDED_SONGS.len());
}

#[tokio::test]
async fn test_add_song_rejects_bad_body() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.add_song("", KNOWN_SONG).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .client
        .post(format!("{}/song", server.base_url))
        .header("content-type", "application/json")
        .body("{\"group\": 1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_get_text_pages_through_verses() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let autumn = 3;

    let response = client.get_text(autumn, 1, 1).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 1);
    assert_eq!(body["payload"]["text"][0]["text"], "rain");

    let response = client.get_text(autumn, 2, 1).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 1);
    assert_eq!(body["payload"]["text"][0]["text"], "wind");

    let response = client.get_text(autumn, 2, 5).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 0);
}

#[tokio::test]
async fn test_get_text_defaults_to_first_verse() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_text_with("1", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 1);
    assert_eq!(body["payload"]["text"][0]["text"], "sprout");
}

#[tokio::test]
async fn test_get_text_of_missing_song_is_empty() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_text(9999, 10, 0).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 0);
}

#[tokio::test]
async fn test_get_text_rejects_bad_numbers() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_text_with("abc", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "id is not a number");

    let response = client.get_text_with("1", &[("limit", "many")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "limit is not a number");
}

#[tokio::test]
async fn test_delete_song_removes_it_and_its_verses() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_song("3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let names = client.get_library_names(&[("limit", "100")]).await;
    assert!(!names.contains(&"Autumn Song".to_string()));

    let response = client.get_text(3, 10, 0).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["count"], 0);

    // Only the verses of the remaining songs are left
    let remaining = client.get_verses(1).await.len() + client.get_verses(2).await.len();
    assert_eq!(remaining, 3);
}

#[tokio::test]
async fn test_delete_missing_song_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_song("9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.delete_song("x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
