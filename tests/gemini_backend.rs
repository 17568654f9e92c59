//! Wire-format tests for `GeminiBackend`.
//!
//! Uses `wiremock` to stand in for the Gemini API so no real network
//! traffic is made. Covers the request body for each capability, response
//! normalization, HTTP failures, and the missing-credential short circuit.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soul_curator::backend::{Backend, Capability, GeminiBackend, GenerateRequest};
use soul_curator::{CuratorConfig, ErrorKind, PipelineError, PipelineState};

const TEXT_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const IMAGE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

fn backend() -> GeminiBackend {
    GeminiBackend::new().with_api_key("test-key")
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn grounding_request_sends_key_and_search_tool() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "역사를 알려줘" }] }],
            "tools": [{ "google_search": {} }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"summary\":" }, { "text": " \"s\"}" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example", "title": "A" } },
                        { "web": { "uri": "https://b.example" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("gemini-2.5-flash", "역사를 알려줘", Capability::SearchGrounding);
    let response = backend()
        .generate(&reqwest::Client::new(), &server.uri(), &request)
        .await
        .expect("grounded call should succeed");

    assert_eq!(response.text, "{\"summary\": \"s\"}");
    assert_eq!(response.citations, vec!["https://a.example", "https://b.example"]);
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn structured_request_sends_schema() {
    let server = MockServer::start().await;
    let schema = json!({ "type": "OBJECT", "properties": { "title": { "type": "STRING" } } });

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema.clone()
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{\"title\": \"t\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new(
        "models/gemini-2.5-flash",
        "plan",
        Capability::StructuredOutput(schema),
    );
    let response = backend()
        .generate(&reqwest::Client::new(), &server.uri(), &request)
        .await
        .expect("structured call should succeed");

    assert_eq!(response.text, "{\"title\": \"t\"}");
    assert!(response.citations.is_empty());
}

#[tokio::test]
async fn image_request_reads_inline_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(body_partial_json(json!({
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your poster." },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("gemini-2.5-flash-image", "draw", Capability::Image);
    let response = backend()
        .generate(&reqwest::Client::new(), &server.uri(), &request)
        .await
        .expect("image call should succeed");

    let image = response.first_inline_image().expect("inline image part");
    assert_eq!(image.mime_type.as_deref(), Some("image/png"));
    assert_eq!(image.data, "iVBORw0KGgo=");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("gemini-2.5-flash", "hi", Capability::Text);
    let err = backend()
        .generate(&reqwest::Client::new(), &server.uri(), &request)
        .await
        .unwrap_err();

    match &err {
        PipelineError::HttpError { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("gemini-2.5-flash", "hi", Capability::Text);
    let err = backend()
        .generate(&reqwest::Client::new(), &server.uri(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let mut pipeline = CuratorConfig::default()
        .with_base_url(server.uri())
        .build_pipeline()
        .expect("pipeline builds without a key");

    let err = pipeline.submit("40계단", "그리움", "에세이").await.unwrap_err();

    assert_eq!(err.to_string(), "failed to retrieve historical information");
    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    assert_eq!(pipeline.state(), PipelineState::Error);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ---------------------------------------------------------------------------
// End to end over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_run_over_http_completes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({ "tools": [{ "google_search": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{
                    "text": "```json\n{\"summary\": \"피란민의 계단\", \"facts\": [\"한국전쟁\"]}\n```"
                }] },
                "groundingMetadata": { "groundingChunks": [{ "web": { "uri": "https://history.example" } }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({ "generationConfig": { "responseMimeType": "application/json" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            &json!({
                "contentType": "에세이",
                "title": "계단의 기억",
                "concept": "c",
                "storyline": "s",
                "empathyPoint": "e",
                "socialPostText": "p",
                "hashtags": ["부산"]
            })
            .to_string(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4AAQ" } }
            ] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = CuratorConfig::default()
        .with_api_key("test-key")
        .with_base_url(format!("{}/v1beta", server.uri()))
        .build_pipeline()
        .expect("pipeline should build");

    let run = pipeline
        .submit("40계단", "그리움", "에세이")
        .await
        .expect("run should complete");

    let (history, plan, poster) = run.artifacts().expect("completed run has artifacts");
    assert_eq!(history.facts, vec!["한국전쟁"]);
    assert!(history.source_urls.as_ref().is_some_and(|s| s.contains("https://history.example")));
    assert_eq!(plan.title, "계단의 기억");
    assert_eq!(poster.image_url, "data:image/jpeg;base64,/9j/4AAQ");
}
