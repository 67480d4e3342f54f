//! Shared helpers for proxy integration tests.
//!
//! `MockUpstream` is a real HTTP server on an ephemeral port that records
//! every request and answers with a canned status, content type and body.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceExt;

use gemrelay_core::{ApiKey, RelaySettings, UpstreamEndpoint};

/// API key used by every test configuration.
pub const TEST_API_KEY: &str = "test-key-0123";

/// Base URL nothing listens on (connection refused).
pub const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1";

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("upstream received JSON")
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Canned upstream server.
pub struct MockUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Start a JSON upstream answering every request with `status` and `body`.
    pub async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_content_type(status, "application/json", body).await
    }

    pub async fn start_with_content_type(
        status: u16,
        content_type: &'static str,
        body: &'static str,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type,
            body,
            requests: requests.clone(),
        };

        let app = Router::new().fallback(record).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// The single request the upstream received.
    pub async fn only_request(&self) -> RecordedRequest {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one upstream call");
        requests.into_iter().next().expect("one request")
    }
}

async fn record(State(state): State<MockState>, uri: Uri, request: Request<Body>) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = request
        .into_body()
        .collect()
        .await
        .map(|c| c.to_bytes())
        .unwrap_or_default();

    state.requests.lock().await.push(RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type,
        body,
    });

    (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body,
    )
        .into_response()
}

/// Test settings pointing at `base_url`.
pub fn test_settings(base_url: &str) -> RelaySettings {
    RelaySettings {
        endpoint: UpstreamEndpoint::new(base_url, "v1beta"),
        ..RelaySettings::with_defaults(ApiKey::new(TEST_API_KEY))
    }
}

/// JSON request body of roughly `size` bytes carrying inline image data.
pub fn inline_data_body(size: usize) -> String {
    format!(
        r#"{{"contents":[{{"parts":[{{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}]}}]}}"#,
        "A".repeat(size)
    )
}

/// Response status and body collected from the proxy router.
pub struct Collected {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Collected {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("proxy returned JSON")
    }
}

/// Drive one request through the router.
pub async fn call(app: &Router, method: &str, uri: &str, body: impl Into<Body>) -> Collected {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes();

    Collected {
        status,
        content_type,
        body,
    }
}
