use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::RecommendationService,
};

pub mod catalog;
pub mod chords;
pub mod recommendations;
pub mod songs;

/// Shared application state
pub struct AppState {
    pub recommendations: RecommendationService,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self { recommendations }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Added after the trace layer so it runs first and the span sees the id
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chords/next", post(chords::next_chord))
        .route("/chords/unlocks", post(chords::song_unlocks))
        .route("/recommendations", post(recommendations::calculate))
        .route("/recommendations/:id", get(recommendations::get))
        .route("/songs/playable", post(songs::playable))
        .route("/songs/personalized", post(songs::personalized))
        .route("/songs/:id/next-chords", post(songs::next_chords))
        .route("/catalog/invalidate", post(catalog::invalidate))
}

/// Health check endpoint
///
/// Reports whether a catalog snapshot is held without triggering a refresh.
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let snapshot = state.recommendations.catalog().current();
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalogLoaded": snapshot.is_some(),
            "songCount": snapshot.map(|s| s.len()).unwrap_or(0),
        })),
    )
}
