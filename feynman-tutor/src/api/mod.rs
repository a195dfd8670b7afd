//! HTTP API handlers for feynman-tutor
//!
//! JSON in, JSON out. Errors use the `{"error": {"code", "message"}}` body
//! produced by [`crate::ApiError`], including bodies rejected by [`ApiJson`].

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::ApiError;

pub mod concepts;
pub mod courses;
pub mod health;
pub mod lectures;
pub mod reviews;
pub mod settings;

pub use concepts::concept_routes;
pub use courses::course_routes;
pub use health::health_routes;
pub use lectures::lecture_routes;
pub use reviews::review_routes;
pub use settings::settings_routes;

/// `axum::Json` whose rejections are reported as [`ApiError::BadRequest`]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
