//! Review session service
//!
//! Drives the Socratic "explain it back" dialogue for one concept:
//! `start` (NotStarted → Active), `continue_review` (Active → Active) and
//! `end` (Active → Ended). The tutor persona is rebuilt from the concept on
//! every call; the history is whatever the caller sends.

use feynman_common::db::{AudienceLevel, Concept, ReviewSessionRecord, Turn};
use feynman_common::time;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::db::review_sessions::{ArchiveOutcome, TurnClaim};
use crate::error::{TutorError, TutorResult};
use crate::models::{EndedReview, ReviewLifecycle, SessionState, StartedReview, TurnReply};
use crate::services::feedback_scorer::FeedbackScorer;
use crate::services::llm_client::{ChatRequest, LanguageModel};
use crate::services::prompts;
use crate::utils::{max_lock_wait_ms, retry_on_lock};

pub struct ReviewService {
    db: SqlitePool,
    model: Arc<dyn LanguageModel>,
    scorer: FeedbackScorer,
    /// Ceiling on served `continue_review` calls per session (`None` = unlimited)
    max_turns: Option<usize>,
}

impl ReviewService {
    pub fn new(db: SqlitePool, model: Arc<dyn LanguageModel>, max_turns: Option<usize>) -> Self {
        let scorer = FeedbackScorer::new(Arc::clone(&model));
        Self {
            db,
            model,
            scorer,
            max_turns,
        }
    }

    /// Begin a review of `concept_id` at the given audience level
    ///
    /// Nothing is persisted unless the model produces the opening question.
    pub async fn start(&self, concept_id: Uuid, audience_level: AudienceLevel) -> TutorResult<StartedReview> {
        let concept = self.load_concept(concept_id).await?;

        let mut history = vec![Turn::user(prompts::OPENING_UTTERANCE)];
        let opening_question = self.tutor_reply(&concept, audience_level, &history).await?;
        history.push(Turn::assistant(opening_question.clone()));

        let lifecycle = ReviewLifecycle::activated(concept.id, audience_level);
        db::review_sessions::insert_lifecycle(&self.db, &lifecycle).await?;

        tracing::info!(
            session_id = %lifecycle.session_id,
            concept_id = %concept.id,
            audience = %audience_level,
            "Review session started"
        );

        Ok(StartedReview {
            session_id: lifecycle.session_id,
            concept,
            audience_level,
            opening_question,
            history,
        })
    }

    /// Send one learner utterance and get the tutor's reply
    ///
    /// Returns the caller's history extended by the utterance and the reply.
    /// The turn ceiling is counted in the session's stored lifecycle, not in
    /// the history. A turn whose model call fails is not counted.
    pub async fn continue_review(
        &self,
        session_id: Uuid,
        history: Vec<Turn>,
        utterance: &str,
    ) -> TutorResult<TurnReply> {
        let lifecycle = self.load_active(session_id).await?;

        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(TutorError::InvalidInput("Utterance must not be empty".to_string()));
        }

        match db::review_sessions::claim_turn(&self.db, session_id, self.max_turns).await? {
            TurnClaim::Claimed => {}
            TurnClaim::LimitReached => {
                return Err(TutorError::TurnLimitReached(self.max_turns.unwrap_or_default()));
            }
            TurnClaim::NotActive => return Err(TutorError::SessionEnded(session_id)),
        }

        let mut history = history;
        history.push(Turn::user(utterance));
        let reply = match self.serve_turn(lifecycle, &history).await {
            Ok(reply) => reply,
            Err(e) => {
                db::review_sessions::release_turn(&self.db, session_id).await?;
                return Err(e);
            }
        };
        history.push(Turn::assistant(reply.clone()));

        tracing::debug!(
            session_id = %session_id,
            turns = history.len(),
            "Review turn completed"
        );

        Ok(TurnReply {
            session_id,
            reply,
            history,
        })
    }

    /// Score the conversation, archive it and apply the progress decision
    ///
    /// One-shot: once a session has ended every further call returns
    /// [`TutorError::SessionEnded`] and no second record is written.
    pub async fn end(&self, session_id: Uuid, history: Vec<Turn>) -> TutorResult<EndedReview> {
        let lifecycle = self.load_active(session_id).await?;
        let concept = self.load_concept(lifecycle.concept_id).await?;

        let scored = self
            .scorer
            .score(&history, &concept.name, &concept.description)
            .await;
        let status = scored.feedback.progress_level;
        if status.rank() < concept.status.rank() {
            tracing::info!(
                concept_id = %concept.id,
                from = %concept.status,
                to = %status,
                "Review lowers concept progress"
            );
        }

        let record = ReviewSessionRecord {
            id: session_id,
            concept_id: concept.id,
            audience_level: lifecycle.audience_level,
            transcript: history,
            feedback: Some(scored.feedback),
            created_at: time::now(),
        };

        let max_wait_ms = max_lock_wait_ms(&self.db).await;
        let outcome = retry_on_lock("archive_session", max_wait_ms, || {
            db::review_sessions::archive_session(&self.db, &record, status)
        })
        .await?;

        if outcome == ArchiveOutcome::NotActive {
            // Another end() won the race between our state check and the archive
            return Err(TutorError::SessionEnded(session_id));
        }

        tracing::info!(
            session_id = %session_id,
            concept_id = %concept.id,
            from = %concept.status,
            to = %status,
            degraded = scored.degraded,
            "Review session ended"
        );

        let concept = self.load_concept(concept.id).await?;

        Ok(EndedReview {
            session: record,
            concept,
            degraded: scored.degraded,
        })
    }

    async fn load_concept(&self, concept_id: Uuid) -> TutorResult<Concept> {
        db::concepts::get_concept(&self.db, concept_id)
            .await?
            .ok_or(TutorError::ConceptNotFound(concept_id))
    }

    async fn load_active(&self, session_id: Uuid) -> TutorResult<ReviewLifecycle> {
        let lifecycle = db::review_sessions::get_lifecycle(&self.db, session_id)
            .await?
            .ok_or(TutorError::SessionNotFound(session_id))?;

        if lifecycle.state.is_terminal() {
            return Err(TutorError::SessionEnded(session_id));
        }
        if !lifecycle.state.can_transition_to(SessionState::Ended) {
            return Err(TutorError::SessionNotFound(session_id));
        }

        Ok(lifecycle)
    }

    async fn serve_turn(&self, lifecycle: ReviewLifecycle, history: &[Turn]) -> TutorResult<String> {
        let concept = self.load_concept(lifecycle.concept_id).await?;
        self.tutor_reply(&concept, lifecycle.audience_level, history).await
    }

    async fn tutor_reply(
        &self,
        concept: &Concept,
        audience_level: AudienceLevel,
        history: &[Turn],
    ) -> TutorResult<String> {
        let request = ChatRequest::new(
            Some(prompts::persona_prompt(
                &concept.name,
                &concept.description,
                audience_level,
            )),
            history.to_vec(),
        );

        let reply = self.model.complete(request).await.map_err(|e| {
            tracing::warn!(concept_id = %concept.id, error = %e, "Tutor model call failed");
            TutorError::UpstreamUnavailable(e.to_string())
        })?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(TutorError::UpstreamUnavailable(
                "Model returned an empty reply".to_string(),
            ));
        }

        Ok(reply.to_string())
    }
}
