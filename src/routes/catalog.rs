use axum::{extract::State, http::StatusCode, Extension};
use std::sync::Arc;

use crate::{middleware::request_id::RequestId, routes::AppState};

/// Forces the next catalog read to refetch from the backing store
pub async fn invalidate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> StatusCode {
    tracing::info!(request_id = %request_id, "Catalog invalidation requested");
    state.recommendations.invalidate_catalog();
    StatusCode::NO_CONTENT
}
