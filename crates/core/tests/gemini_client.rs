//! GeminiClient against a local stand-in for the upstream API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{Value, json};

use cognitax_core::extraction::{
    DocumentExtractor, ExtractionError, GeminiClient, GeminiConfig, RetryPolicy, Sleeper,
};

const API_KEY: &str = "test-api-key";

#[derive(Clone, Copy)]
enum Processing {
    /// PROCESSING for this many checks, then ACTIVE.
    ActiveAfter(u32),
    Failed,
    Never,
}

#[derive(Clone)]
struct Upstream {
    base: String,
    processing: Processing,
    status_checks: Arc<AtomicU32>,
    uploaded: Arc<Mutex<Vec<u8>>>,
    generate_body: Arc<Mutex<Option<Value>>>,
    generate_fails: bool,
}

#[derive(Debug, Clone, Default)]
struct CountingSleeper {
    sleeps: Arc<AtomicU32>,
}

impl Sleeper for CountingSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn has_key(headers: &HeaderMap) -> bool {
    header(headers, "x-goog-api-key") == Some(API_KEY)
}

async fn start_upload(
    State(up): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let resumable = header(&headers, "x-goog-upload-protocol") == Some("resumable");
    let start = header(&headers, "x-goog-upload-command") == Some("start");
    if !has_key(&headers) || !resumable || !start || body["file"]["display_name"].is_null() {
        return (StatusCode::BAD_REQUEST, "bad start request").into_response();
    }
    (
        StatusCode::OK,
        [("x-goog-upload-url", format!("{}/upload-session/1", up.base))],
    )
        .into_response()
}

async fn transfer(State(up): State<Upstream>, headers: HeaderMap, body: Bytes) -> Response {
    let finalize = header(&headers, "x-goog-upload-command") == Some("upload, finalize");
    let offset = header(&headers, "x-goog-upload-offset") == Some("0");
    if !finalize || !offset {
        return (StatusCode::BAD_REQUEST, "bad transfer request").into_response();
    }
    up.uploaded.lock().unwrap().extend_from_slice(&body);
    Json(json!({
        "file": {
            "name": "files/doc1",
            "uri": format!("{}/v1beta/files/doc1", up.base),
            "mimeType": "application/pdf",
            "state": "PROCESSING"
        }
    }))
    .into_response()
}

async fn file_status(State(up): State<Upstream>, Path(id): Path<String>) -> Response {
    let check = up.status_checks.fetch_add(1, Ordering::SeqCst) + 1;
    let state = match up.processing {
        Processing::ActiveAfter(n) if check > n => "ACTIVE",
        Processing::Failed => "FAILED",
        _ => "PROCESSING",
    };
    Json(json!({
        "name": format!("files/{id}"),
        "uri": format!("{}/v1beta/files/{id}", up.base),
        "state": state
    }))
    .into_response()
}

async fn generate(
    State(up): State<Upstream>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if action != "gemini-2.0-flash:generateContent" || !has_key(&headers) {
        return (StatusCode::NOT_FOUND, "unknown model").into_response();
    }
    if up.generate_fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }
    *up.generate_body.lock().unwrap() = Some(body);
    Json(json!({
        "candidates": [{
            "content": {"parts": [{"text": "```json\n"}, {"text": "{\"ok\": true}"}, {"text": "\n```"}]}
        }]
    }))
    .into_response()
}

async fn spawn_upstream(processing: Processing, generate_fails: bool) -> Upstream {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let upstream = Upstream {
        base,
        processing,
        status_checks: Arc::new(AtomicU32::new(0)),
        uploaded: Arc::new(Mutex::new(Vec::new())),
        generate_body: Arc::new(Mutex::new(None)),
        generate_fails,
    };

    let app = Router::new()
        .route("/upload/v1beta/files", post(start_upload))
        .route("/upload-session/1", put(transfer))
        .route("/v1beta/files/{id}", get(file_status))
        .route("/v1beta/models/{action}", post(generate))
        .with_state(upstream.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

fn client(up: &Upstream, max_attempts: u32) -> (GeminiClient<CountingSleeper>, CountingSleeper) {
    let sleeper = CountingSleeper::default();
    let client = GeminiClient::new(GeminiConfig {
        api_key: API_KEY.to_string(),
        model: "gemini-2.0-flash".to_string(),
        api_base: format!("{}/v1beta", up.base),
        upload_base: format!("{}/upload/v1beta", up.base),
        request_timeout: Duration::from_secs(10),
        poll: RetryPolicy {
            interval: Duration::from_secs(2),
            max_attempts,
        },
    })
    .unwrap()
    .with_sleeper(sleeper.clone());
    (client, sleeper)
}

#[tokio::test]
async fn test_submit_waits_until_active() {
    let up = spawn_upstream(Processing::ActiveAfter(2), false).await;
    let (client, sleeper) = client(&up, 30);

    let handle = client
        .submit_document(Bytes::from_static(b"%PDF-1.4 test"), "application/pdf", "statement.pdf")
        .await
        .unwrap();

    assert_eq!(handle.name, "files/doc1");
    assert_eq!(handle.uri, format!("{}/v1beta/files/doc1", up.base));
    assert_eq!(handle.mime_type, "application/pdf");
    assert_eq!(up.uploaded.lock().unwrap().as_slice(), b"%PDF-1.4 test");
    assert_eq!(up.status_checks.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_submit_failed_state_is_external_error() {
    let up = spawn_upstream(Processing::Failed, false).await;
    let (client, _) = client(&up, 30);

    let result = client
        .submit_document(Bytes::from_static(b"%PDF"), "application/pdf", "statement.pdf")
        .await;

    assert!(matches!(result, Err(ExtractionError::ExternalService { .. })));
    assert_eq!(up.status_checks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_times_out_after_bounded_checks() {
    let up = spawn_upstream(Processing::Never, false).await;
    let (client, sleeper) = client(&up, 4);

    let result = client
        .submit_document(Bytes::from_static(b"%PDF"), "application/pdf", "statement.pdf")
        .await;

    assert!(matches!(result, Err(ExtractionError::Timeout(_))));
    assert_eq!(up.status_checks.load(Ordering::SeqCst), 4);
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_generate_sends_document_and_instruction() {
    let up = spawn_upstream(Processing::ActiveAfter(0), false).await;
    let (client, _) = client(&up, 30);
    let handle = client
        .submit_document(Bytes::from_static(b"%PDF"), "application/pdf", "statement.pdf")
        .await
        .unwrap();

    let text = client
        .generate("extract everything", Some(&handle), Some("be exact"))
        .await
        .unwrap();

    assert_eq!(text, "```json\n{\"ok\": true}\n```");
    let body = up.generate_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["fileData"]["fileUri"], handle.uri);
    assert_eq!(body["contents"][0]["parts"][1]["text"], "extract everything");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be exact");
}

#[tokio::test]
async fn test_generate_upstream_error_carries_status_and_body() {
    let up = spawn_upstream(Processing::ActiveAfter(0), true).await;
    let (client, _) = client(&up, 30);

    let result = client.generate("tips", None, None).await;

    match result {
        Err(ExtractionError::ExternalService { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "model overloaded");
        }
        other => panic!("expected external service error, got {other:?}"),
    }
}
