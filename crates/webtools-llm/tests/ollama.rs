//! OllamaBackend against an in-process stand-in for the Ollama HTTP API.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use webtools_llm::{ChatMessage, ChatRequest, GenerateOptions, GenerateRequest, LlmBackend, LlmError, OllamaBackend};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fake_ollama() -> Router {
    Router::new()
        .route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                // echo back what the client sent so the test can inspect it
                Json(json!({
                    "model": body["model"],
                    "response": format!(
                        "{}|{}|{}",
                        body["model"].as_str().unwrap_or_default(),
                        body["stream"],
                        body["options"]["num_predict"],
                    ),
                    "done": true,
                }))
            }),
        )
        .route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let turns = body["messages"].as_array().map(Vec::len).unwrap_or_default();
                Json(json!({
                    "message": {"role": "assistant", "content": format!("{turns} turns")},
                    "done": true,
                }))
            }),
        )
        .route(
            "/api/tags",
            get(|| async {
                Json(json!({"models": [
                    {"name": "llama3.2:latest", "size": 2019393189u64, "modified_at": "2024-10-01T10:00:00Z"},
                    {"name": "qwen2.5"}
                ]}))
            }),
        )
}

#[tokio::test]
async fn test_generate_sends_options_and_default_model() {
    let host = spawn(fake_ollama()).await;
    let backend = OllamaBackend::new(host, "llama3.2");

    let out = backend
        .generate(GenerateRequest::new("SELECT?", GenerateOptions::SQL))
        .await
        .unwrap();
    assert_eq!(out, "llama3.2|false|1000");

    let out = backend
        .generate(GenerateRequest::new("hi", GenerateOptions::TRANSLATION).with_model(Some("qwen2.5".into())))
        .await
        .unwrap();
    assert_eq!(out, "qwen2.5|false|2000");
}

#[tokio::test]
async fn test_chat_posts_all_turns() {
    let host = spawn(fake_ollama()).await;
    let backend = OllamaBackend::new(host, "llama3.2");
    let req = ChatRequest {
        messages: vec![
            ChatMessage { role: "user".into(), content: "hi".into() },
            ChatMessage { role: "assistant".into(), content: "hello".into() },
            ChatMessage::user("explain joins"),
        ],
        model: None,
        options: GenerateOptions::CHAT,
    };
    assert_eq!(backend.chat(req).await.unwrap(), "3 turns");
}

#[tokio::test]
async fn test_list_models_tolerates_missing_fields() {
    let host = spawn(fake_ollama()).await;
    let models = OllamaBackend::new(host, "llama3.2").list_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "llama3.2:latest");
    assert_eq!(models[1].size, 0);
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "model 'nope' not found"}))) }),
    );
    let host = spawn(app).await;
    let err = OllamaBackend::new(host, "nope")
        .generate(GenerateRequest::new("x", GenerateOptions::SQL))
        .await
        .unwrap_err();
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "model 'nope' not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_response_field_is_invalid() {
    let app = Router::new().route("/api/generate", post(|| async { Json(json!({"done": true})) }));
    let host = spawn(app).await;
    let err = OllamaBackend::new(host, "llama3.2")
        .generate(GenerateRequest::new("x", GenerateOptions::SQL))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse));
}

#[tokio::test]
async fn test_unreachable_host_is_http_error() {
    let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2");
    assert!(matches!(backend.list_models().await, Err(LlmError::Http(_))));
}
