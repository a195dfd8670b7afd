//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" while no API key is configured
    pub status: String,
    /// Module name ("feynman-tutor")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Git commit the binary was built from
    pub git_hash: String,
    /// Cargo build profile
    pub build_profile: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether a language model API key is currently available
    pub llm_configured: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let llm_configured = state.api_key.read().await.is_some();

    Json(HealthResponse {
        status: if llm_configured { "ok" } else { "degraded" }.to_string(),
        module: "feynman-tutor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("FEYNMAN_GIT_HASH").to_string(),
        build_profile: env!("FEYNMAN_BUILD_PROFILE").to_string(),
        uptime_seconds,
        llm_configured,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
