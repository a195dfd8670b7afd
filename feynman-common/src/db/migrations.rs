//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//! Tables are created with their current shape by `init`; migrations will
//! upgrade databases written by older builds once the schema changes.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - users upgrade from any older version
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Check before altering** - every migration must be safe to re-run

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 0;

/// Get current schema version from database
///
/// Returns 0 if the schema_version table is empty
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
///
/// The initial schema is version 0, so there is nothing to apply yet. New
/// migrations go here as `if current_version < N { migrate_vN(pool) }`
/// followed by recording version N in `schema_version`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!("Database schema is up to date (v{})", current_version);
    Ok(())
}
