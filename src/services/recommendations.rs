use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{
        known_chords, Chord, KnownChords, NextChord, Song, SongId, SongProgress,
        StoredRecommendation,
    },
    services::{catalog_cache::CatalogCache, scorer},
};

/// Entry point for chord and song recommendations
///
/// Every operation takes one snapshot from the catalog cache and runs the
/// scorer against it, so a single answer never mixes two catalog versions.
pub struct RecommendationService {
    catalog: Arc<CatalogCache>,
    store: Arc<dyn RecommendationStore>,
    retention: Duration,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<CatalogCache>,
        store: Arc<dyn RecommendationStore>,
        retention: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            retention,
        }
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Computes the next-chord recommendation and persists it for later retrieval
    ///
    /// The user id is recorded as given; whether such a user exists is the
    /// account service's concern.
    pub async fn calculate_recommendation(
        &self,
        user_id: &str,
        known: Vec<Chord>,
    ) -> AppResult<Uuid> {
        if user_id.trim().is_empty() {
            return Err(AppError::InvalidInput("userId cannot be empty".to_string()));
        }

        let known = known_chords(known);
        let outcome = self.request_with(&known).await?;

        let mut sorted: Vec<Chord> = known.into_iter().collect();
        sorted.sort();

        let record = StoredRecommendation {
            recommendation_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            known_chords: sorted,
            outcome,
            created_at: Utc::now(),
        };

        self.store.put(&record, self.retention).await?;

        tracing::info!(
            recommendation_id = %record.recommendation_id,
            user_id = %user_id,
            chord = ?record.outcome.recommendation().map(|r| r.recommended_chord.as_str()),
            retention_secs = self.retention.as_secs(),
            "Recommendation persisted"
        );

        Ok(record.recommendation_id)
    }

    pub async fn get_recommendation(&self, id: Uuid) -> AppResult<StoredRecommendation> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recommendation {}", id)))
    }

    /// Stateless next-chord recommendation
    pub async fn request_chord_recommendation(&self, known: Vec<Chord>) -> AppResult<NextChord> {
        self.request_with(&known_chords(known)).await
    }

    /// Songs that learning `candidate` would unlock
    pub async fn request_song_unlock_recommendation(
        &self,
        known: Vec<Chord>,
        candidate: &Chord,
    ) -> AppResult<Vec<SongId>> {
        let snapshot = self.catalog.get().await?;
        let unlocked = scorer::songs_unlocked_by(&known_chords(known), candidate, &snapshot)?;

        tracing::debug!(
            candidate = %candidate,
            unlocked = unlocked.len(),
            "Computed songs unlocked by candidate"
        );

        Ok(unlocked)
    }

    /// Songs the learner can already play
    pub async fn playable_songs(
        &self,
        known: Vec<Chord>,
        limit: Option<usize>,
    ) -> AppResult<Vec<Song>> {
        let snapshot = self.catalog.get().await?;
        let known = known_chords(known);

        Ok(scorer::playable_songs(&known, &snapshot, scorer::song_limit(limit))
            .into_iter()
            .cloned()
            .collect())
    }

    /// Songs the learner is closest to playing, with the chords each still needs
    pub async fn personalized_songs(
        &self,
        known: Vec<Chord>,
        limit: Option<usize>,
    ) -> AppResult<Vec<SongProgress>> {
        let snapshot = self.catalog.get().await?;
        Ok(scorer::closest_songs(
            &known_chords(known),
            &snapshot,
            scorer::song_limit(limit),
        ))
    }

    /// Chords still missing for one target song
    pub async fn next_chords_for_song(
        &self,
        known: Vec<Chord>,
        song_id: &SongId,
    ) -> AppResult<Vec<Chord>> {
        let snapshot = self.catalog.get().await?;
        let song = snapshot
            .song(song_id)
            .ok_or_else(|| AppError::NotFound(format!("song {}", song_id)))?;

        Ok(scorer::missing_chords(&known_chords(known), song))
    }

    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate();
    }

    async fn request_with(&self, known: &KnownChords) -> AppResult<NextChord> {
        let start = Instant::now();
        let snapshot = self.catalog.get().await?;
        let outcome = scorer::next_chord(known, &snapshot);

        tracing::info!(
            known = known.len(),
            songs = snapshot.len(),
            chord = ?outcome.recommendation().map(|r| r.recommended_chord.as_str()),
            score = outcome.recommendation().map(|r| r.score),
            elapsed_us = start.elapsed().as_micros(),
            "Chord recommendation computed"
        );

        Ok(outcome)
    }
}
