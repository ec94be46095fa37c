use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod catalog;
pub mod recommendation;
pub mod song;

pub use catalog::CatalogSnapshot;
pub use recommendation::{NextChord, Recommendation, SongProgress, StoredRecommendation};
pub use song::{Chord, KnownChords, Song, SongId};

// ============================================================================
// API request/response types
// ============================================================================

/// Request carrying only the learner's known chords
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextChordRequest {
    pub known_chords: Vec<Chord>,
}

/// Request to list the songs a specific candidate chord would unlock
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongUnlockRequest {
    pub known_chords: Vec<Chord>,
    pub candidate_chord: Chord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedSongsResponse {
    pub unlocked_songs: Vec<SongId>,
}

/// Request to compute and persist a recommendation for a user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRecommendationRequest {
    pub user_id: String,
    pub known_chords: Vec<Chord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRecommendationResponse {
    pub recommendation_id: Uuid,
}

/// Request for a bounded list of songs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongListRequest {
    pub known_chords: Vec<Chord>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayableSongsResponse {
    pub songs: Vec<Song>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedSongsResponse {
    pub songs: Vec<SongProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextChordsForSongResponse {
    pub song_id: SongId,
    pub missing_chords: Vec<Chord>,
}

/// Collapses a request's chord list into a set
pub fn known_chords(chords: Vec<Chord>) -> KnownChords {
    chords.into_iter().collect()
}
