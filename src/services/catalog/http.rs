//! Catalog served as a JSON array over HTTP
//!
//! Accepts the record shape produced by the catalog export tooling:
//! `{id, title, artist, chords, simplifiedChords, difficulty, tags}`. When a
//! record carries simplified chords those are what a learner must know;
//! otherwise the raw chord list is used.

use crate::{
    error::{AppError, AppResult},
    models::Song,
    services::catalog::CatalogStore,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogRecord {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    chords: Vec<String>,
    #[serde(default)]
    simplified_chords: Vec<String>,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    genre: Option<String>,
}

impl From<CatalogRecord> for Song {
    fn from(record: CatalogRecord) -> Self {
        let chords = if record.simplified_chords.is_empty() {
            record.chords
        } else {
            record.simplified_chords
        };

        let mut genres = record.tags;
        if let Some(genre) = record.genre {
            if !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        let mut song = Song::new(record.id, chords);
        song.title = record.title;
        song.artist = record.artist;
        song.difficulty = record.difficulty;
        song.genres = genres;
        song
    }
}

#[derive(Clone)]
pub struct HttpCatalogStore {
    http_client: HttpClient,
    catalog_url: String,
}

impl HttpCatalogStore {
    pub fn new(catalog_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            catalog_url,
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn fetch_catalog(&self) -> AppResult<Vec<Song>> {
        tracing::debug!(url = %self.catalog_url, "Fetching catalog over HTTP");

        let response = self.http_client.get(&self.catalog_url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %self.catalog_url,
                status = %status,
                body = %body,
                "Catalog request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Catalog returned status {}: {}",
                status, body
            )));
        }

        let records: Vec<CatalogRecord> = response.json().await?;

        Ok(records.into_iter().map(Song::from).collect())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chord;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_catalog_success() {
        let server = MockServer::start();
        let catalog_mock = server.mock(|when, then| {
            when.method(GET).path("/songs.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([
                    {
                        "id": "four-chord-journey",
                        "title": "Four Chord Journey",
                        "artist": "Curated",
                        "chords": ["C", "G", "Am", "F"],
                        "difficulty": 1,
                        "tags": ["pop"]
                    },
                    {
                        "id": "sunrise-groove",
                        "chords": ["G7", "Cmaj7", "D"],
                        "simplifiedChords": ["C", "D", "G"]
                    }
                ]));
        });

        let store = HttpCatalogStore::new(server.url("/songs.json"));
        let songs = store.fetch_catalog().await.unwrap();

        catalog_mock.assert();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id.as_str(), "four-chord-journey");
        assert_eq!(songs[0].chords.len(), 4);
        assert_eq!(songs[0].difficulty, Some(1.0));
        assert_eq!(songs[0].genres, vec!["pop".to_string()]);
        assert!(songs[1].chords.contains(&Chord::from("C")));
        assert!(!songs[1].chords.contains(&Chord::from("Cmaj7")));
    }

    #[tokio::test]
    async fn test_fetch_catalog_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/songs.json");
            then.status(503).body("maintenance");
        });

        let store = HttpCatalogStore::new(server.url("/songs.json"));
        let result = store.fetch_catalog().await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("503"));
    }

    #[test]
    fn test_record_genre_merged_into_tags() {
        let record: CatalogRecord = serde_json::from_value(json!({
            "_id": "abc",
            "chords": ["E"],
            "genre": "folk",
            "tags": ["acoustic"]
        }))
        .unwrap();

        let song = Song::from(record);
        assert_eq!(song.id.as_str(), "abc");
        assert_eq!(song.genres, vec!["acoustic".to_string(), "folk".to_string()]);
    }
}
