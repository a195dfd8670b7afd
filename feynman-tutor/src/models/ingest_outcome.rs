//! Lecture ingestion results

use feynman_common::db::{Concept, Lecture};
use serde::Serialize;

/// How the best-effort decomposition step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Decomposition {
    /// A validated batch was stored
    Succeeded,
    /// Model error or invalid output; the lecture was kept without concepts
    Failed(String),
}

/// Result of ingesting one lecture
///
/// The lecture is always present: only storage failures abort ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub lecture: Lecture,
    pub concepts: Vec<Concept>,
    pub decomposition: Decomposition,
}
