//! Lecture endpoints, including ingestion

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use feynman_common::db::{Concept, Lecture};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::ApiJson;
use crate::models::IngestOutcome;
use crate::{db, ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct IngestLectureRequest {
    pub name: String,
    /// Lecture body as plain text
    pub text: String,
}

/// Lecture with its concepts in decomposition order
#[derive(Debug, Serialize)]
pub struct LectureDetail {
    #[serde(flatten)]
    pub lecture: Lecture,
    pub concepts: Vec<Concept>,
}

/// POST /courses/:id/lectures
///
/// Always 201 once the lecture is stored; a failed decomposition shows up as
/// `decomposition.status = "failed"` with an empty concept list.
pub async fn ingest_lecture(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    ApiJson(payload): ApiJson<IngestLectureRequest>,
) -> ApiResult<(StatusCode, Json<IngestOutcome>)> {
    let outcome = state
        .ingestion
        .ingest(course_id, &payload.name, &payload.text)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /courses/:id/lectures
pub async fn list_lectures(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Lecture>>> {
    if db::courses::get_course(&state.db, course_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Course not found: {}", course_id)));
    }

    Ok(Json(db::lectures::list_lectures(&state.db, course_id).await?))
}

/// GET /lectures/:id
pub async fn get_lecture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LectureDetail>> {
    let lecture = db::lectures::get_lecture(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lecture not found: {}", id)))?;
    let concepts = db::concepts::list_concepts(&state.db, id).await?;

    Ok(Json(LectureDetail { lecture, concepts }))
}

/// DELETE /lectures/:id
pub async fn delete_lecture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !db::lectures::delete_lecture(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Lecture not found: {}", id)));
    }

    tracing::info!(lecture_id = %id, "Lecture deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /lectures/:id/concepts
pub async fn list_lecture_concepts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Concept>>> {
    if db::lectures::get_lecture(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Lecture not found: {}", id)));
    }

    Ok(Json(db::concepts::list_concepts(&state.db, id).await?))
}

pub fn lecture_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/:id/lectures",
            get(list_lectures).post(ingest_lecture),
        )
        .route("/lectures/:id", get(get_lecture).delete(delete_lecture))
        .route("/lectures/:id/concepts", get(list_lecture_concepts))
}
