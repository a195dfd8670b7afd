//! Concept endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use feynman_common::db::{Concept, ReviewSessionRecord};
use uuid::Uuid;

use crate::{db, ApiError, ApiResult, AppState};

/// GET /concepts/:id
pub async fn get_concept(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Concept>> {
    db::concepts::get_concept(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Concept not found: {}", id)))
}

/// DELETE /concepts/:id
pub async fn delete_concept(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !db::concepts::delete_concept(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Concept not found: {}", id)));
    }

    tracing::info!(concept_id = %id, "Concept deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /concepts/:id/sessions
///
/// Archived review sessions, oldest first.
pub async fn list_concept_sessions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ReviewSessionRecord>>> {
    if db::concepts::get_concept(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Concept not found: {}", id)));
    }

    Ok(Json(
        db::review_sessions::list_sessions_for_concept(&state.db, id).await?,
    ))
}

pub fn concept_routes() -> Router<AppState> {
    Router::new()
        .route("/concepts/:id", get(get_concept).delete(delete_concept))
        .route("/concepts/:id/sessions", get(list_concept_sessions))
}
