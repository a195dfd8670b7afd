//! Feedback scorer
//!
//! Turns a finished transcript into a structured assessment with a single
//! progress decision. Scoring never fails: a model error or an unusable
//! response yields the deterministic fallback from
//! [`ScoredFeedback::fallback`].

use feynman_common::db::{Feedback, ProgressStatus, Turn};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::ScoredFeedback;
use crate::services::llm_client::{ChatRequest, LanguageModel};
use crate::services::prompts;

/// Scoring response as emitted by the model, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedback {
    summary: Option<String>,
    #[serde(default, alias = "clearly_explained")]
    clearly_explained: Vec<String>,
    #[serde(default, alias = "unclear_points")]
    unclear_points: Vec<String>,
    #[serde(default, alias = "jargon_used")]
    jargon_used: Vec<String>,
    #[serde(alias = "progress_level")]
    progress_level: Option<String>,
}

/// Validate a scoring response into a [`Feedback`]
///
/// Requires a JSON object with a non-empty summary and a progress level
/// from the closed four-value set. List fields default to empty.
pub fn parse_feedback(response: &str) -> Result<Feedback, String> {
    let payload = prompts::strip_code_fence(response);

    let raw: RawFeedback =
        serde_json::from_str(payload).map_err(|e| format!("invalid feedback JSON: {}", e))?;

    let summary = raw.summary.map(|s| s.trim().to_string()).unwrap_or_default();
    if summary.is_empty() {
        return Err("feedback summary is missing".to_string());
    }

    let level = raw
        .progress_level
        .ok_or_else(|| "progress level is missing".to_string())?;
    let progress_level = level
        .parse::<ProgressStatus>()
        .map_err(|_| format!("unknown progress level: {}", level))?;

    Ok(Feedback {
        summary,
        clearly_explained: raw.clearly_explained,
        unclear_points: raw.unclear_points,
        jargon_used: raw.jargon_used,
        progress_level,
    })
}

pub struct FeedbackScorer {
    model: Arc<dyn LanguageModel>,
}

impl FeedbackScorer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Score a transcript for one concept
    pub async fn score(
        &self,
        transcript: &[Turn],
        concept_name: &str,
        concept_description: &str,
    ) -> ScoredFeedback {
        let request = ChatRequest::new(
            Some(prompts::feedback_system_prompt()),
            vec![Turn::user(prompts::feedback_user_prompt(
                concept_name,
                concept_description,
                transcript,
            ))],
        )
        .json_object();

        let response = match self.model.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    concept = concept_name,
                    error = %e,
                    "Feedback model call failed, using fallback assessment"
                );
                return ScoredFeedback::fallback();
            }
        };

        match parse_feedback(&response) {
            Ok(feedback) => {
                tracing::debug!(
                    concept = concept_name,
                    level = %feedback.progress_level,
                    "Feedback scored"
                );
                ScoredFeedback {
                    feedback,
                    degraded: false,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    concept = concept_name,
                    reason = %reason,
                    "Feedback response unusable, using fallback assessment"
                );
                ScoredFeedback::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_feedback() {
        let feedback = parse_feedback(
            r#"{
                "summary": "Good use of the kitchen analogy.",
                "clearlyExplained": ["inputs"],
                "unclearPoints": ["where oxygen goes"],
                "jargonUsed": ["chloroplast"],
                "progressLevel": "Understood"
            }"#,
        )
        .unwrap();

        assert_eq!(feedback.progress_level, ProgressStatus::Understood);
        assert_eq!(feedback.clearly_explained, vec!["inputs"]);
        assert_eq!(feedback.jargon_used, vec!["chloroplast"]);
    }

    #[test]
    fn test_parse_snake_case_and_lenient_level() {
        let feedback = parse_feedback(
            r#"{"summary": "s", "unclear_points": ["x"], "progress_level": "not_started"}"#,
        )
        .unwrap();

        assert_eq!(feedback.progress_level, ProgressStatus::NotStarted);
        assert_eq!(feedback.unclear_points, vec!["x"]);
        assert!(feedback.clearly_explained.is_empty());
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = parse_feedback(r#"{"summary": "s", "progressLevel": "Expert"}"#).unwrap_err();
        assert!(err.contains("Expert"));
    }

    #[test]
    fn test_missing_summary_rejected() {
        assert!(parse_feedback(r#"{"progressLevel": "Mastered"}"#).is_err());
        assert!(parse_feedback(r#"{"summary": "  ", "progressLevel": "Mastered"}"#).is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(parse_feedback("[]").is_err());
        assert!(parse_feedback("Great job!").is_err());
    }

    #[test]
    fn test_wrong_list_type_rejected() {
        assert!(parse_feedback(r#"{"summary": "s", "jargonUsed": "none", "progressLevel": "Reviewing"}"#).is_err());
    }
}
