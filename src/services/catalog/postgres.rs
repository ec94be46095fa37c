use sqlx::PgPool;

use crate::{error::AppResult, models::Song, services::catalog::CatalogStore};

/// Row shape of the `songs` table
#[derive(Debug, sqlx::FromRow)]
struct SongRow {
    id: String,
    title: Option<String>,
    artist: Option<String>,
    chords: Vec<String>,
    difficulty: Option<f64>,
    genres: Vec<String>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        let mut song = Song::new(row.id, row.chords);
        song.title = row.title;
        song.artist = row.artist;
        song.difficulty = row.difficulty;
        song.genres = row.genres;
        song
    }
}

/// Catalog backed by the `songs` table in PostgreSQL
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn fetch_catalog(&self) -> AppResult<Vec<Song>> {
        // Only the columns scoring needs; lyrics and sections stay in the database
        let rows = sqlx::query_as::<_, SongRow>(
            r#"
            SELECT id, title, artist, chords, difficulty, genres
            FROM songs
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(rows = rows.len(), "Loaded songs from database");

        Ok(rows.into_iter().map(Song::from).collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chord;

    #[test]
    fn test_song_row_conversion() {
        let row = SongRow {
            id: "song-1".to_string(),
            title: Some("Four Chord Journey".to_string()),
            artist: None,
            chords: vec!["C".to_string(), "G".to_string(), "C".to_string()],
            difficulty: Some(1.0),
            genres: vec!["pop".to_string()],
        };

        let song = Song::from(row);
        assert_eq!(song.id.as_str(), "song-1");
        assert_eq!(song.title.as_deref(), Some("Four Chord Journey"));
        assert_eq!(song.chords.len(), 2);
        assert!(song.chords.contains(&Chord::from("G")));
        assert_eq!(song.difficulty, Some(1.0));
        assert_eq!(song.genres, vec!["pop".to_string()]);
    }
}
