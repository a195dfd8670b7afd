//! Lecture ingestion orchestrator
//!
//! Step 1 stores the lecture and must succeed. Step 2 asks the language
//! model to decompose the text into concepts and is best-effort: any model
//! or validation failure leaves the lecture stored with zero concepts.
//! There is no retry and no rollback of step 1.

use feynman_common::db::{Concept, Lecture, Turn};
use feynman_common::{time, uuid_utils};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::error::{TutorError, TutorResult};
use crate::models::{Decomposition, IngestOutcome};
use crate::services::llm_client::{ChatRequest, LanguageModel};
use crate::services::prompts::{self, MAX_CONCEPTS, MIN_CONCEPTS};

/// One element of the model's decomposition array
#[derive(Debug, Deserialize)]
struct RawConcept {
    #[serde(alias = "name")]
    concept_name: Option<String>,
    #[serde(alias = "description")]
    concept_description: Option<String>,
}

/// Validate a decomposition response into `(name, description)` pairs
///
/// Accepts only a top-level JSON array (optionally inside a code fence)
/// whose every element has a non-empty name and description. Fewer than
/// [`MIN_CONCEPTS`] elements is rejected; more than [`MAX_CONCEPTS`] is
/// truncated. Any invalid element rejects the whole batch.
pub fn parse_concept_batch(response: &str) -> Result<Vec<(String, String)>, String> {
    let payload = prompts::strip_code_fence(response);

    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| format!("response is not valid JSON: {}", e))?;

    let serde_json::Value::Array(items) = value else {
        return Err("response is not a JSON array".to_string());
    };

    if items.len() < MIN_CONCEPTS {
        return Err(format!(
            "expected at least {} concepts, got {}",
            MIN_CONCEPTS,
            items.len()
        ));
    }

    let mut batch = Vec::with_capacity(items.len().min(MAX_CONCEPTS));
    for (index, item) in items.into_iter().enumerate() {
        let raw: RawConcept = serde_json::from_value(item)
            .map_err(|e| format!("element {} is not a concept object: {}", index, e))?;

        let name = raw.concept_name.map(|s| s.trim().to_string()).unwrap_or_default();
        let description = raw
            .concept_description
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if name.is_empty() || description.is_empty() {
            return Err(format!("element {} has an empty name or description", index));
        }

        batch.push((name, description));
    }

    if batch.len() > MAX_CONCEPTS {
        tracing::warn!(
            returned = batch.len(),
            kept = MAX_CONCEPTS,
            "Decomposition returned too many concepts, truncating"
        );
        batch.truncate(MAX_CONCEPTS);
    }

    Ok(batch)
}

/// Lecture ingestion service
pub struct IngestionOrchestrator {
    db: SqlitePool,
    model: Arc<dyn LanguageModel>,
    max_lecture_chars: usize,
}

impl IngestionOrchestrator {
    pub fn new(db: SqlitePool, model: Arc<dyn LanguageModel>, max_lecture_chars: usize) -> Self {
        Self {
            db,
            model,
            max_lecture_chars,
        }
    }

    /// Store a lecture and decompose it into concepts
    ///
    /// Errors only for invalid input, an unknown course, or storage failure.
    pub async fn ingest(&self, course_id: Uuid, name: &str, raw_text: &str) -> TutorResult<IngestOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TutorError::InvalidInput("Lecture name must not be empty".to_string()));
        }
        if raw_text.trim().is_empty() {
            return Err(TutorError::InvalidInput("Lecture text must not be empty".to_string()));
        }
        let length = raw_text.chars().count();
        if length > self.max_lecture_chars {
            return Err(TutorError::InvalidInput(format!(
                "Lecture text is {} characters, limit is {}",
                length, self.max_lecture_chars
            )));
        }

        if db::courses::get_course(&self.db, course_id).await?.is_none() {
            return Err(TutorError::CourseNotFound(course_id));
        }

        // Step 1: persist the lecture (fatal on failure)
        let lecture = Lecture {
            id: uuid_utils::generate(),
            course_id,
            name: name.to_string(),
            raw_text: raw_text.to_string(),
            created_at: time::now(),
        };
        db::lectures::insert_lecture(&self.db, &lecture).await?;

        tracing::info!(
            lecture_id = %lecture.id,
            course_id = %course_id,
            chars = length,
            "Lecture stored, requesting decomposition"
        );

        // Step 2: best-effort decomposition
        let (concepts, decomposition) = match self.decompose(&lecture).await {
            Ok(batch) => {
                let concepts = db::concepts::insert_concepts(&self.db, lecture.id, &batch).await?;
                tracing::info!(
                    lecture_id = %lecture.id,
                    concepts = concepts.len(),
                    "Lecture decomposed into concepts"
                );
                (concepts, Decomposition::Succeeded)
            }
            Err(reason) => {
                tracing::warn!(
                    lecture_id = %lecture.id,
                    reason = %reason,
                    "Decomposition failed, keeping lecture without concepts"
                );
                (Vec::<Concept>::new(), Decomposition::Failed(reason))
            }
        };

        Ok(IngestOutcome {
            lecture,
            concepts,
            decomposition,
        })
    }

    async fn decompose(&self, lecture: &Lecture) -> Result<Vec<(String, String)>, String> {
        let request = ChatRequest::new(
            Some(prompts::decomposition_system_prompt()),
            vec![Turn::user(prompts::decomposition_user_prompt(
                &lecture.name,
                &lecture.raw_text,
            ))],
        );

        let response = self
            .model
            .complete(request)
            .await
            .map_err(|e| format!("model call failed: {}", e))?;

        parse_concept_batch(&response)
    }
}
