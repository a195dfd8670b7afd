//! Timestamp utilities
//!
//! Timestamps are stored in SQLite as fixed-width RFC 3339 text
//! (nanoseconds, `Z` suffix) so that string order matches time order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored RFC 3339 timestamp
pub fn from_db(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

/// Parse an optional stored timestamp
pub fn from_db_opt(column: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.map(|s| from_db(column, &s)).transpose()
}
