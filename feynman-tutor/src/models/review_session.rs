//! Review session state machine
//!
//! NotStarted → Active → Ended. Transitions are linear; `Ended` is terminal
//! and a new session must be started for another review of the same concept.
//!
//! Only the lifecycle state is persisted between calls. The conversation
//! itself is an explicit value owned by the caller and re-sent every turn.

use chrono::{DateTime, Utc};
use feynman_common::db::{AudienceLevel, Concept, ReviewSessionRecord, Turn};
use feynman_common::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No lifecycle record exists yet
    NotStarted,
    /// Opening question delivered, accepting turns
    Active,
    /// Transcript archived and scored
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "NotStarted",
            SessionState::Active => "Active",
            SessionState::Ended => "Ended",
        }
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::NotStarted, SessionState::Active)
                | (SessionState::Active, SessionState::Ended)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotStarted" => Ok(SessionState::NotStarted),
            "Active" => Ok(SessionState::Active),
            "Ended" => Ok(SessionState::Ended),
            other => Err(Error::Internal(format!("Unknown session state: {}", other))),
        }
    }
}

/// Persisted lifecycle of one review session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLifecycle {
    pub session_id: Uuid,
    pub concept_id: Uuid,
    pub audience_level: AudienceLevel,
    pub state: SessionState,
    /// `continue` calls served so far (failed model calls are not counted)
    pub turns: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ReviewLifecycle {
    /// Lifecycle for a session whose opening question was just delivered
    pub fn activated(concept_id: Uuid, audience_level: AudienceLevel) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            concept_id,
            audience_level,
            state: SessionState::Active,
            turns: 0,
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

/// Result of `start`
#[derive(Debug, Clone, Serialize)]
pub struct StartedReview {
    pub session_id: Uuid,
    pub concept: Concept,
    pub audience_level: AudienceLevel,
    pub opening_question: String,
    /// Opening learner utterance plus the tutor's first question
    pub history: Vec<Turn>,
}

/// Result of `continue`
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub session_id: Uuid,
    pub reply: String,
    pub history: Vec<Turn>,
}

/// Result of `end`
#[derive(Debug, Clone, Serialize)]
pub struct EndedReview {
    /// The archived transcript and feedback
    pub session: ReviewSessionRecord,
    /// Concept after the progress decision was applied
    pub concept: Concept,
    /// True when the feedback is the fallback assessment
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_linear() {
        use SessionState::*;
        assert!(NotStarted.can_transition_to(Active));
        assert!(Active.can_transition_to(Ended));

        assert!(!NotStarted.can_transition_to(Ended));
        assert!(!Active.can_transition_to(NotStarted));
        assert!(!Ended.can_transition_to(Active));
        assert!(!Ended.can_transition_to(NotStarted));
        assert!(!Ended.can_transition_to(Ended));
    }

    #[test]
    fn test_only_ended_is_terminal() {
        assert!(SessionState::Ended.is_terminal());
        assert!(!SessionState::Active.is_terminal());
        assert!(!SessionState::NotStarted.is_terminal());
    }

    #[test]
    fn test_activated_lifecycle() {
        let concept_id = Uuid::new_v4();
        let lifecycle = ReviewLifecycle::activated(concept_id, AudienceLevel::Classmate);
        assert_eq!(lifecycle.state, SessionState::Active);
        assert_eq!(lifecycle.concept_id, concept_id);
        assert_eq!(lifecycle.turns, 0);
        assert!(lifecycle.ended_at.is_none());
    }
}
