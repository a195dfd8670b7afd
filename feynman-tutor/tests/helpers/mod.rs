//! Shared test helpers
//!
//! - [`ScriptedModel`]: `LanguageModel` double replaying queued responses
//! - [`test_state`] / [`test_app`]: in-memory database wired to the router
//! - [`send`]: one request through `Router::oneshot`, JSON body decoded

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use feynman_tutor::services::{ChatRequest, LanguageModel, LlmError};
use feynman_tutor::{build_router, AppState, ServiceLimits};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

/// Language model double
///
/// Each call pops the next scripted result; an exhausted script answers
/// with a network error. Every request is recorded for inspection.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(&self, error: LlmError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Network("script exhausted".to_string())))
    }
}

/// JSON array of `count` valid decomposition entries
pub fn concept_batch(count: usize) -> String {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "concept_name": format!("Concept {}", i + 1),
                "concept_description": format!("What concept {} means.", i + 1),
            })
        })
        .collect();
    serde_json::to_string(&items).unwrap()
}

/// Feedback response in the scorer's JSON-object format
pub fn feedback_json(level: &str) -> String {
    json!({
        "summary": "You explained the core idea with a clear analogy.",
        "clearlyExplained": ["the inputs", "the outputs"],
        "unclearPoints": ["where the energy is stored"],
        "jargonUsed": ["chlorophyll"],
        "progressLevel": level,
    })
    .to_string()
}

pub fn default_limits() -> ServiceLimits {
    ServiceLimits {
        max_lecture_chars: 200_000,
        max_turns: None,
    }
}

pub async fn test_pool() -> SqlitePool {
    feynman_common::db::init_memory_database().await.unwrap()
}

pub fn test_state(pool: SqlitePool, model: Arc<ScriptedModel>, limits: ServiceLimits) -> AppState {
    let api_key = Arc::new(RwLock::new(Some("sk-test-key-0000".to_string())));
    AppState::new(pool, model, api_key, limits)
}

pub async fn test_app(model: Arc<ScriptedModel>) -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let app = build_router(test_state(pool.clone(), model, default_limits()));
    (app, pool)
}

pub async fn create_course(pool: &SqlitePool) -> Uuid {
    feynman_tutor::db::courses::create_course(pool, "Biology 101", None)
        .await
        .unwrap()
        .id
}

/// Ingest a lecture whose decomposition yields `count` concepts
pub async fn seed_concepts(pool: &SqlitePool, count: usize) -> Vec<feynman_common::db::Concept> {
    let course_id = create_course(pool).await;
    let model = ScriptedModel::new();
    model.reply(concept_batch(count));

    let ingestion = feynman_tutor::services::IngestionOrchestrator::new(pool.clone(), model, 200_000);
    ingestion
        .ingest(course_id, "Photosynthesis", "Plants turn light into sugar.")
        .await
        .unwrap()
        .concepts
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(body) => send_raw(app, method, uri, Some("application/json"), body.to_string()).await,
        None => send_raw(app, method, uri, None, String::new()).await,
    }
}

/// Like [`send`] but with an arbitrary body and optional content type
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.into())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}
