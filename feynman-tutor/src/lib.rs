//! feynman-tutor library interface
//!
//! Exposes the services, router and state so `main` and the integration
//! tests assemble the service the same way.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult, TutorError, TutorResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{ApiKeyHandle, IngestionOrchestrator, LanguageModel, ReviewService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub ingestion: Arc<IngestionOrchestrator>,
    pub reviews: Arc<ReviewService>,
    /// Live API key shared with the model client
    pub api_key: ApiKeyHandle,
    /// TOML file that receives API key write-backs, if any
    pub toml_path: Option<PathBuf>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

/// Tunables that shape the services built by [`AppState::new`]
#[derive(Debug, Clone)]
pub struct ServiceLimits {
    pub max_lecture_chars: usize,
    pub max_turns: Option<usize>,
}

impl AppState {
    /// Wire every service onto one pool and one model
    pub fn new(
        db: SqlitePool,
        model: Arc<dyn LanguageModel>,
        api_key: ApiKeyHandle,
        limits: ServiceLimits,
    ) -> Self {
        let ingestion = IngestionOrchestrator::new(
            db.clone(),
            Arc::clone(&model),
            limits.max_lecture_chars,
        );
        let reviews = ReviewService::new(db.clone(), model, limits.max_turns);

        Self {
            db,
            ingestion: Arc::new(ingestion),
            reviews: Arc::new(reviews),
            api_key,
            toml_path: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_toml_path(mut self, path: PathBuf) -> Self {
        self.toml_path = Some(path);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::course_routes())
        .merge(api::lecture_routes())
        .merge(api::concept_routes())
        .merge(api::review_routes())
        .merge(api::settings_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
