//! Database retry logic
//!
//! Exponential backoff for transient SQLite lock errors. The total retry
//! window comes from the `db_max_lock_wait_ms` setting.
//!
//! **Backoff:** 10ms initial, doubling, capped at 1000ms per sleep.
//! Non-lock errors are returned immediately.

use sqlx::SqlitePool;
use std::future::Future;
use std::time::{Duration, Instant};
use feynman_common::{Error, Result};

const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

/// Read the retry window from settings, falling back to 5000ms
pub async fn max_lock_wait_ms(pool: &SqlitePool) -> u64 {
    match feynman_common::db::get_setting(pool, "db_max_lock_wait_ms").await {
        Ok(Some(value)) => value.parse().unwrap_or(DEFAULT_MAX_LOCK_WAIT_MS),
        _ => DEFAULT_MAX_LOCK_WAIT_MS,
    }
}

/// Whether an error is SQLite reporting a busy/locked database
fn is_lock_error(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) => {
            matches!(db_err.code().as_deref(), Some("5") | Some("6"))
                || db_err.message().contains("database is locked")
        }
        _ => false,
    }
}

/// Retry a database operation until it succeeds, fails with a non-lock
/// error, or `max_wait_ms` elapses
pub async fn retry_on_lock<F, Fut, T>(operation_name: &str, max_wait_ms: u64, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start_time = Instant::now();
    let max_duration = Duration::from_millis(max_wait_ms);
    let mut attempt = 0u32;
    let mut backoff_ms = 10u64;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Database operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => err,
        };

        if !is_lock_error(&err) {
            return Err(err);
        }

        let elapsed = start_time.elapsed();
        if elapsed >= max_duration {
            tracing::error!(
                operation = operation_name,
                attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                max_wait_ms,
                "Database operation failed: max retry time exceeded"
            );
            return Err(err);
        }

        tracing::warn!(
            operation = operation_name,
            attempt,
            backoff_ms,
            "Database locked, will retry after backoff"
        );

        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = (backoff_ms * 2).min(1000);
    }
}
