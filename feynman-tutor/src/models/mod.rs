//! Data models for feynman-tutor
//!
//! - Review session lifecycle state machine
//! - Ingestion and scoring outcomes

pub mod feedback;
pub mod ingest_outcome;
pub mod review_session;

pub use feedback::{ScoredFeedback, FALLBACK_SUMMARY};
pub use ingest_outcome::{Decomposition, IngestOutcome};
pub use review_session::{
    EndedReview, ReviewLifecycle, SessionState, StartedReview, TurnReply,
};
