//! Language model client
//!
//! [`LanguageModel`] is the single seam through which the tutor talks to an
//! external model. Decomposition, conversation turns and feedback scoring
//! are all prompts over this one capability, so tests substitute a scripted
//! implementation and production uses [`OpenAiClient`] against any
//! OpenAI-compatible `/chat/completions` endpoint.
//!
//! The client performs exactly one HTTP request per call. Timeouts come from
//! the HTTP client configuration; retries are deliberately absent.

use async_trait::async_trait;
use feynman_common::config::LlmConfig;
use feynman_common::db::{Role, Turn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

const USER_AGENT: &str = concat!("feynman-tutor/", env!("CARGO_PKG_VERSION"));

/// Shared, runtime-updatable API key
///
/// Held by both the client and the settings endpoint so a key configured
/// through the API takes effect without a restart.
pub type ApiKeyHandle = Arc<RwLock<Option<String>>>;

/// Language model client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for the language model")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// One completion request: optional system instruction plus ordered history
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub messages: Vec<Turn>,
    /// Ask the provider to constrain output to a single JSON object
    pub json_object: bool,
}

impl ChatRequest {
    pub fn new(system: Option<String>, messages: Vec<Turn>) -> Self {
        Self {
            system,
            messages,
            json_object: false,
        }
    }

    pub fn json_object(mut self) -> Self {
        self.json_object = true;
        self
    }
}

/// External language model capability
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the model's reply text for the given request
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: ApiKeyHandle,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: ApiKeyHandle) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .read()
            .await
            .clone()
            .ok_or(LlmError::MissingApiKey)?;

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.messages.iter().map(|turn| WireMessage {
            role: wire_role(turn.role),
            content: &turn.content,
        }));

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            response_format: request
                .json_object
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        tracing::debug!(
            model = %self.model,
            messages = body.messages.len(),
            json_object = request.json_object,
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(status.as_u16(), error_text));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
