//! OpenAI-compatible client tests against a local stub server

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use feynman_common::config::LlmConfig;
use feynman_common::db::Turn;
use feynman_tutor::services::{ChatRequest, LanguageModel, LlmError, OpenAiClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// What the stub answers and what it saw
#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push((auth, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Serve the stub on a random port and return its base URL
async fn spawn_stub(stub: Stub) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn client(base_url: String, key: Option<&str>) -> OpenAiClient {
    let config = LlmConfig {
        base_url,
        model: "test-model".to_string(),
        temperature: 0.3,
        ..Default::default()
    };
    let handle = Arc::new(RwLock::new(key.map(str::to_string)));
    OpenAiClient::new(&config, handle).unwrap()
}

fn stub(status: StatusCode, reply: Value) -> Stub {
    Stub {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    }
}

#[tokio::test]
async fn test_successful_completion() {
    let stub = stub(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "Why is the sky blue?"}}]}),
    );
    let seen = Arc::clone(&stub.seen);
    let base = spawn_stub(stub).await;

    let request = ChatRequest::new(
        Some("You are a child.".to_string()),
        vec![Turn::user("Ready"), Turn::assistant("Go"), Turn::user("Light scatters")],
    )
    .json_object();
    let reply = client(base, Some("sk-stub")).complete(request).await.unwrap();

    assert_eq!(reply, "Why is the sky blue?");

    let seen = seen.lock().unwrap();
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-stub"));
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"].as_array().unwrap().len(), 4);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][2]["role"], "assistant");
    assert_eq!(body["response_format"]["type"], "json_object");
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_key() {
    let base = spawn_stub(stub(StatusCode::UNAUTHORIZED, json!({"error": "bad key"}))).await;

    let err = client(base, Some("sk-wrong"))
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::InvalidApiKey));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let base = spawn_stub(stub(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"}))).await;

    let err = client(base, Some("sk-stub"))
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap_err();

    match err {
        LlmError::Api(status, body) => {
            assert_eq!(status, 429);
            assert!(body.contains("slow down"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_maps_to_empty_response() {
    let base = spawn_stub(stub(StatusCode::OK, json!({"choices": []}))).await;

    let err = client(base, Some("sk-stub"))
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_key_swapped_at_runtime() {
    let stub = stub(
        StatusCode::OK,
        json!({"choices": [{"message": {"content": "ok"}}]}),
    );
    let seen = Arc::clone(&stub.seen);
    let base = spawn_stub(stub).await;

    let handle = Arc::new(RwLock::new(None));
    let config = LlmConfig {
        base_url: base,
        ..Default::default()
    };
    let client = OpenAiClient::new(&config, Arc::clone(&handle)).unwrap();

    let err = client
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));

    *handle.write().await = Some("sk-late".to_string());
    client
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("Bearer sk-late"));
}

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_network() {
    // Nothing listens on the discard port
    let err = client("http://127.0.0.1:9/v1".to_string(), Some("sk-stub"))
        .complete(ChatRequest::new(None, vec![Turn::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Network(_)));
}
