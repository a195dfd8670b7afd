//! Course endpoints
//!
//! Courses only group lectures; ingestion lives under
//! `POST /courses/:id/lectures` in [`super::lectures`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use feynman_common::db::Course;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiJson;
use crate::{db, ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /courses
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Course name must not be empty".to_string()));
    }

    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let course = db::courses::create_course(&state.db, name, description).await?;
    tracing::info!(course_id = %course.id, name = %course.name, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /courses
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(db::courses::list_courses(&state.db).await?))
}

/// GET /courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    db::courses::get_course(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Course not found: {}", id)))
}

/// DELETE /courses/:id
///
/// Lectures, concepts and review history of the course cascade away.
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !db::courses::delete_course(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Course not found: {}", id)));
    }

    tracing::info!(course_id = %id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:id", get(get_course).delete(delete_course))
}
