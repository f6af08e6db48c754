//! Drivers against an in-process mock of the model APIs.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::{Value, json};

use pdf_analyzer::config::Credential;
use pdf_analyzer::document::{AnalysisResult, DocumentOutcome, UploadedDocument};
use pdf_analyzer::llm::{AnalysisClient, AnalysisError, LlmSettings, Provider};
use pdf_analyzer::pdf::LopdfExtractor;
use pdf_analyzer::pipeline::DocumentAnalysisPipeline;

#[derive(Clone, Default)]
struct Mock {
    calls: Arc<AtomicUsize>,
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gemini_settings(base_url: &str) -> LlmSettings {
    let mut settings = LlmSettings::new(base_url, "gemini-2.5-pro", Some(Credential::new("test-key")));
    settings.provider = Provider::Gemini;
    settings
}

async fn gemini_ok(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "API key not valid" } })),
        );
    }
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    let reply = if prompt.contains("Hello World") {
        "**Executive Summary:** greeting"
    } else {
        "**Executive Summary:** unknown"
    };
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [
                { "content": { "parts": [ { "text": reply } ] }, "finishReason": "STOP" }
            ]
        })),
    )
}

async fn gemini_quota(State(mock): State<Mock>) -> (StatusCode, Json<Value>) {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": { "code": 429, "message": "Resource has been exhausted" } })),
    )
}

#[tokio::test]
async fn test_gemini_round_trip_through_pipeline() {
    let mock = Mock::default();
    let app = Router::new()
        .route("/v1beta/models/{model}", post(gemini_ok))
        .with_state(mock.clone());
    let base = spawn(app).await;

    let client = AnalysisClient::from_settings(&gemini_settings(&base)).unwrap();
    let pipeline = DocumentAnalysisPipeline::new(Arc::new(LopdfExtractor::new()), client);

    let outcome = pipeline
        .process(UploadedDocument::new(
            "hello.pdf",
            common::pdf_with_pages(&["Hello World"]),
        ))
        .await;

    assert_eq!(
        outcome,
        DocumentOutcome::Analyzed(AnalysisResult::Success(
            "**Executive Summary:** greeting".to_string()
        ))
    );
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gemini_error_status_is_single_failure() {
    let mock = Mock::default();
    let app = Router::new()
        .route("/v1beta/models/{model}", post(gemini_quota))
        .with_state(mock.clone());
    let base = spawn(app).await;

    let client = AnalysisClient::from_settings(&gemini_settings(&base)).unwrap();
    let err = client.analyze("prompt").await.unwrap_err();

    let AnalysisError::Request(message) = err;
    assert!(message.contains("429"), "{message}");
    assert!(message.contains("Resource has been exhausted"), "{message}");
    // No retries.
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_completions_driver() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(
                headers.get("authorization").and_then(|v| v.to_str().ok()),
                Some("Bearer test-key")
            );
            assert_eq!(body["stream"], false);
            Json(json!({
                "choices": [ { "message": { "role": "assistant", "content": "compat reply" } } ]
            }))
        }),
    );
    let base = spawn(app).await;

    let settings = LlmSettings::new(&base, "local-model", Some(Credential::new("test-key")));
    assert_eq!(settings.provider, Provider::Generic);

    let client = AnalysisClient::from_settings(&settings).unwrap();
    assert_eq!(client.analyze("prompt").await.unwrap(), "compat reply");
}

#[tokio::test]
async fn test_connection_refused_is_analysis_failure() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        AnalysisClient::from_settings(&gemini_settings(&format!("http://{addr}"))).unwrap();
    let pipeline = DocumentAnalysisPipeline::new(Arc::new(LopdfExtractor::new()), client);

    let outcome = pipeline
        .process(UploadedDocument::new(
            "hello.pdf",
            common::pdf_with_pages(&["Hello World"]),
        ))
        .await;

    match outcome {
        DocumentOutcome::Analyzed(AnalysisResult::Failure(reason)) => {
            assert!(reason.starts_with("An error occurred while calling the model API"));
        }
        other => panic!("expected analysis failure, got {other:?}"),
    }
}
