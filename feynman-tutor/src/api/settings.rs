//! Settings API endpoint
//!
//! `GET /settings/llm-api-key` reports whether a key is configured (masked).
//! `POST /settings/llm-api-key` stores a key in the database, backs it up to
//! the TOML file, and swaps it into the running model client.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ApiJson;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SetApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    /// Key with all but the last four characters masked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_key: Option<String>,
}

/// GET /settings/llm-api-key
pub async fn get_llm_api_key(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    let key = state.api_key.read().await;

    Json(ApiKeyStatus {
        configured: key.is_some(),
        masked_key: key.as_deref().map(crate::config::mask_key),
    })
}

/// POST /settings/llm-api-key
///
/// **Errors:** 400 for an empty or whitespace-only key. TOML write failures
/// are logged and do not fail the request.
pub async fn set_llm_api_key(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SetApiKeyRequest>,
) -> ApiResult<Json<ApiKeyStatus>> {
    if !crate::config::is_valid_key(&payload.api_key) {
        return Err(ApiError::BadRequest(
            "API key cannot be empty or whitespace-only".to_string(),
        ));
    }
    let key = payload.api_key.trim().to_string();

    crate::db::settings::set_llm_api_key(&state.db, &key)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save API key to database: {}", e)))?;

    if let Some(path) = state.toml_path.as_deref() {
        crate::config::sync_api_key_to_toml(&key, path);
    }

    let masked = crate::config::mask_key(&key);
    *state.api_key.write().await = Some(key);

    info!("LLM API key configured via settings API");

    Ok(Json(ApiKeyStatus {
        configured: true,
        masked_key: Some(masked),
    }))
}

pub fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/settings/llm-api-key",
        get(get_llm_api_key).post(set_llm_api_key),
    )
}
