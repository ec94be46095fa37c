use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{NextChord, NextChordRequest, SongUnlockRequest, UnlockedSongsResponse},
    routes::AppState,
};

/// Recommends the next chord to learn without persisting anything
pub async fn next_chord(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NextChordRequest>,
) -> AppResult<Json<NextChord>> {
    tracing::info!(
        request_id = %request_id,
        known_count = request.known_chords.len(),
        "Processing next chord request"
    );

    let outcome = state
        .recommendations
        .request_chord_recommendation(request.known_chords)
        .await?;

    Ok(Json(outcome))
}

/// Lists the songs a candidate chord would unlock
pub async fn song_unlocks(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SongUnlockRequest>,
) -> AppResult<Json<UnlockedSongsResponse>> {
    tracing::info!(
        request_id = %request_id,
        candidate = %request.candidate_chord,
        known_count = request.known_chords.len(),
        "Processing song unlock request"
    );

    let unlocked_songs = state
        .recommendations
        .request_song_unlock_recommendation(request.known_chords, &request.candidate_chord)
        .await?;

    Ok(Json(UnlockedSongsResponse { unlocked_songs }))
}
