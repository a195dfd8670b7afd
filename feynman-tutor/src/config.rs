//! Configuration resolution for feynman-tutor
//!
//! The language model API key is resolved from three tiers with
//! Database → ENV → TOML priority. Unlike the other settings it may be
//! missing at startup; it can be supplied later through the settings API.

use feynman_common::config::TomlConfig;
use feynman_common::Result;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable consulted for the API key
pub const API_KEY_ENV: &str = "FEYNMAN_LLM_API_KEY";

/// Resolve the language model API key
///
/// **Priority:** Database → ENV → TOML. Returns `None` when no tier holds a
/// usable key.
pub async fn resolve_llm_api_key(db: &SqlitePool, toml_config: &TomlConfig) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_llm_api_key(db)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.llm.api_key.clone().filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        (db_key.is_some(), "database"),
        (env_key.is_some(), "environment"),
        (toml_key.is_some(), "TOML"),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, name)| *name)
    .collect();

    if sources.len() > 1 {
        warn!(
            "LLM API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = db_key {
        info!("LLM API key loaded from database");
        return Ok(Some(key));
    }
    if let Some(key) = env_key {
        info!("LLM API key loaded from environment variable");
        return Ok(Some(key));
    }
    if let Some(key) = toml_key {
        info!("LLM API key loaded from TOML config");
        return Ok(Some(key));
    }

    warn!(
        "LLM API key not configured. Ingestion and feedback will degrade and reviews \
         will fail until one is provided via:\n\
         1. API: POST /settings/llm-api-key\n\
         2. Environment: {}=your-key-here\n\
         3. TOML config: [llm] api_key = \"your-key\"",
        API_KEY_ENV
    );
    Ok(None)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Render a key for display, keeping only its last four characters
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Copy a newly stored API key into the TOML file as a backup
///
/// Best-effort: the database write is authoritative, so a failed TOML
/// write is only logged.
pub fn sync_api_key_to_toml(key: &str, toml_path: &Path) {
    let mut config = if toml_path.exists() {
        match feynman_common::config::load_toml_config(toml_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Skipping TOML write-back, existing file unreadable: {}", e);
                return;
            }
        }
    } else {
        TomlConfig::default()
    };

    config.llm.api_key = Some(key.to_string());

    match feynman_common::config::write_toml_config(&config, toml_path) {
        Ok(()) => info!("LLM API key synced to TOML: {}", toml_path.display()),
        Err(e) => warn!("TOML write failed (database write succeeded): {}", e),
    }
}
