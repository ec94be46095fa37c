use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        NextChordRequest, NextChordsForSongResponse, PersonalizedSongsResponse,
        PlayableSongsResponse, SongId, SongListRequest,
    },
    routes::AppState,
};

/// Songs already playable with the known chords
pub async fn playable(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SongListRequest>,
) -> AppResult<Json<PlayableSongsResponse>> {
    tracing::info!(
        request_id = %request_id,
        known_count = request.known_chords.len(),
        limit = ?request.limit,
        "Processing playable songs request"
    );

    let songs = state
        .recommendations
        .playable_songs(request.known_chords, request.limit)
        .await?;

    Ok(Json(PlayableSongsResponse { songs }))
}

/// Songs closest to playable, fewest missing chords first
pub async fn personalized(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SongListRequest>,
) -> AppResult<Json<PersonalizedSongsResponse>> {
    tracing::info!(
        request_id = %request_id,
        known_count = request.known_chords.len(),
        limit = ?request.limit,
        "Processing personalized songs request"
    );

    let songs = state
        .recommendations
        .personalized_songs(request.known_chords, request.limit)
        .await?;

    Ok(Json(PersonalizedSongsResponse { songs }))
}

pub async fn next_chords(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(song_id): Path<String>,
    Json(request): Json<NextChordRequest>,
) -> AppResult<Json<NextChordsForSongResponse>> {
    tracing::info!(
        request_id = %request_id,
        song_id = %song_id,
        known_count = request.known_chords.len(),
        "Processing next chords for song request"
    );

    let song_id = SongId::from(song_id);
    let missing_chords = state
        .recommendations
        .next_chords_for_song(request.known_chords, &song_id)
        .await?;

    Ok(Json(NextChordsForSongResponse {
        song_id,
        missing_chords,
    }))
}
