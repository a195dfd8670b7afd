//! Feedback scoring results

use feynman_common::db::{Feedback, ProgressStatus};
use serde::Serialize;

/// Summary used when the scoring model output cannot be used
pub const FALLBACK_SUMMARY: &str =
    "Sorry, we couldn't generate detailed feedback for this session. \
     Your conversation was saved; try reviewing this concept again soon.";

/// Assessment plus whether it came from the deterministic fallback
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFeedback {
    pub feedback: Feedback,
    pub degraded: bool,
}

impl ScoredFeedback {
    /// Fixed assessment substituted when scoring fails
    pub fn fallback() -> Self {
        Self {
            feedback: Feedback {
                summary: FALLBACK_SUMMARY.to_string(),
                clearly_explained: Vec::new(),
                unclear_points: Vec::new(),
                jargon_used: Vec::new(),
                progress_level: ProgressStatus::Reviewing,
            },
            degraded: true,
        }
    }
}
