//! Core tutor services
//!
//! - [`IngestionOrchestrator`]: lecture storage + concept decomposition
//! - [`ReviewService`]: start / continue / end of a review dialogue
//! - [`FeedbackScorer`]: transcript → assessment + progress decision
//! - [`LanguageModel`]: the model capability all three are built on

pub mod feedback_scorer;
pub mod ingestion;
pub mod llm_client;
pub mod prompts;
pub mod review_session;

pub use feedback_scorer::FeedbackScorer;
pub use ingestion::IngestionOrchestrator;
pub use llm_client::{ApiKeyHandle, ChatRequest, LanguageModel, LlmError, OpenAiClient};
pub use review_session::ReviewService;
