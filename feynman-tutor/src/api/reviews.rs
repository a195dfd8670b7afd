//! Review session endpoints
//!
//! The client holds the conversation: every turn and the final `end` call
//! carry the full history returned by the previous response.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use feynman_common::db::{AudienceLevel, Turn};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiJson;
use crate::models::{EndedReview, StartedReview, TurnReply};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct StartReviewRequest {
    pub concept_id: Uuid,
    /// Classmate, MiddleSchooler or Child (case/separator-insensitive)
    pub audience_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ContinueReviewRequest {
    #[serde(default)]
    pub history: Vec<Turn>,
    pub utterance: String,
}

#[derive(Debug, Deserialize)]
pub struct EndReviewRequest {
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// POST /reviews
pub async fn start_review(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StartReviewRequest>,
) -> ApiResult<(StatusCode, Json<StartedReview>)> {
    let audience_level = payload.audience_level.parse::<AudienceLevel>()?;
    let started = state.reviews.start(payload.concept_id, audience_level).await?;

    Ok((StatusCode::CREATED, Json(started)))
}

/// POST /reviews/:id/turns
pub async fn continue_review(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    ApiJson(payload): ApiJson<ContinueReviewRequest>,
) -> ApiResult<Json<TurnReply>> {
    let reply = state
        .reviews
        .continue_review(session_id, payload.history, &payload.utterance)
        .await?;

    Ok(Json(reply))
}

/// POST /reviews/:id/end
pub async fn end_review(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    ApiJson(payload): ApiJson<EndReviewRequest>,
) -> ApiResult<Json<EndedReview>> {
    let ended = state.reviews.end(session_id, payload.history).await?;
    Ok(Json(ended))
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(start_review))
        .route("/reviews/:id/turns", post(continue_review))
        .route("/reviews/:id/end", post(end_review))
}
