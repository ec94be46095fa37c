use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CalculateRecommendationRequest, CalculateRecommendationResponse, StoredRecommendation},
    routes::AppState,
};

/// Computes a recommendation for a user and stores it for later retrieval
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CalculateRecommendationRequest>,
) -> AppResult<(StatusCode, Json<CalculateRecommendationResponse>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        known_count = request.known_chords.len(),
        "Processing recommendation calculation"
    );

    let recommendation_id = state
        .recommendations
        .calculate_recommendation(&request.user_id, request.known_chords)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CalculateRecommendationResponse { recommendation_id }),
    ))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<StoredRecommendation>> {
    tracing::info!(
        request_id = %request_id,
        recommendation_id = %id,
        "Fetching stored recommendation"
    );

    // Malformed ids can never have been issued
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound(format!("recommendation {}", id)))?;

    let record = state.recommendations.get_recommendation(id).await?;
    Ok(Json(record))
}
