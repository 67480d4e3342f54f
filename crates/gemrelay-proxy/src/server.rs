//! Axum HTTP server for the Gemini proxy.
//!
//! This module provides `router()` for building the application and
//! `serve()` for running it on a pre-bound TcpListener.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, State,
        rejection::{BytesRejection, FailedToBufferBody},
    },
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use gemrelay_core::{
    DispatchError, RelaySettings, RequestMode, TargetIdentifier, UpstreamUrl, build_upstream_url,
    classify_mode, extract_target_identifier, legacy_upstream_body, parse_legacy_request,
    passthrough_body, relay,
};

use crate::forward::{forward_to_upstream, stream_from_upstream};
use crate::models::{HealthResponse, RootResponse, relay_response};

/// Shared application state for the proxy server.
///
/// Read-only after construction; the credential lives in `settings`.
#[derive(Clone)]
struct AppState {
    /// HTTP client for forwarding requests upstream.
    client: Client,
    /// Validated runtime settings.
    settings: Arc<RelaySettings>,
}

/// Build the proxy router.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn router(settings: RelaySettings) -> anyhow::Result<Router> {
    let mut builder = Client::builder().pool_max_idle_per_host(10);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;
    let body_limit = DefaultBodyLimit::max(settings.max_body_bytes);

    let state = AppState {
        client,
        settings: Arc::new(settings),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Method mismatches on the fixed routes fall through to generic dispatch.
    Ok(Router::new()
        .route("/", get(root).fallback(dispatch))
        .route("/healthz", get(healthz).fallback(dispatch))
        .route(
            "/api/gemini-proxy",
            post(legacy_generate).fallback(dispatch),
        )
        .route(
            "/api/gemini-proxy-stream",
            post(legacy_stream).fallback(dispatch),
        )
        .fallback(dispatch)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Start the proxy server with a pre-bound listener.
///
/// Runs until the cancellation token is triggered.
///
/// # Returns
///
/// Returns `Ok(())` on clean shutdown, or an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    settings: RelaySettings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        upstream = %settings.endpoint.base_url,
        api_version = %settings.endpoint.api_version,
        default_model = %settings.default_model,
        status_policy = ?settings.status_policy,
        stream_passthrough = settings.stream_passthrough,
        max_body_bytes = settings.max_body_bytes,
        "Proxy server starting on {addr}"
    );

    let app = router(settings)?;

    info!("Proxy server running on port {}", addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Proxy server shut down");
    Ok(())
}

/// Service identification endpoint.
async fn root() -> impl IntoResponse {
    Json(RootResponse::default())
}

/// Health check endpoint.
async fn healthz() -> impl IntoResponse {
    Json(HealthResponse::now())
}

/// Generic dispatch: any path, any method.
///
/// The model comes from `models/<id>:` in the path, the mode from the
/// presence of `streamGenerateContent`, and the body is forwarded verbatim.
async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let path = uri.path();
    let target = extract_target_identifier(path, &state.settings.default_model);
    let mode = classify_mode(path);

    info!(%method, path, model = %target, %mode, "Dispatching request");

    let body = match inbound_body(body).and_then(passthrough_body) {
        Ok(body) => body,
        Err(e) => return respond(&state, Err(e), mode),
    };

    let url = match upstream_url(&state, &target, mode) {
        Ok(url) => url.with_query(caller_query(&uri)),
        Err(e) => return respond(&state, Err(e), mode),
    };

    send(&state, &url, body, mode).await
}

/// `POST /api/gemini-proxy`
async fn legacy_generate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    legacy(&state, body, RequestMode::Standard).await
}

/// `POST /api/gemini-proxy-stream`
async fn legacy_stream(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    legacy(&state, body, RequestMode::Streaming).await
}

/// Legacy routes take the model from the body and forward a filtered body.
async fn legacy(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
    mode: RequestMode,
) -> Response {
    let request = match inbound_body(body).and_then(|raw| parse_legacy_request(&raw)) {
        Ok(request) => request,
        Err(e) => return respond(state, Err(e), mode),
    };

    let target = request.target(&state.settings.default_model);
    info!(model = %target, %mode, "Processing legacy proxy request");

    let url = match upstream_url(state, &target, mode) {
        Ok(url) => url,
        Err(e) => return respond(state, Err(e), mode),
    };

    let outbound = legacy_upstream_body(&request, mode);
    let body = match serde_json::to_vec(&outbound) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => return respond(state, Err(DispatchError::InvalidRequest(e.to_string())), mode),
    };

    send(state, &url, body, mode).await
}

/// Surface body extraction failures as dispatch errors.
fn inbound_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, DispatchError> {
    body.map_err(|rejection| match &rejection {
        BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
            DispatchError::PayloadTooLarge(rejection.body_text())
        }
        _ => DispatchError::InvalidRequest(rejection.body_text()),
    })
}

fn upstream_url(
    state: &AppState,
    target: &TargetIdentifier,
    mode: RequestMode,
) -> Result<UpstreamUrl, DispatchError> {
    build_upstream_url(
        &state.settings.endpoint,
        target,
        mode,
        &state.settings.api_key,
    )
}

/// Query parameters supplied by the caller (e.g. `alt=sse`).
fn caller_query(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Perform the upstream call and relay its outcome.
async fn send(state: &AppState, url: &UpstreamUrl, body: Bytes, mode: RequestMode) -> Response {
    debug!(upstream = %url, %mode, "Routing to upstream");

    if mode.is_streaming() && state.settings.stream_passthrough {
        return match stream_from_upstream(&state.client, url, body).await {
            Ok(response) => response,
            Err(e) => respond(state, Err(e), mode),
        };
    }

    let result = forward_to_upstream(&state.client, url, body).await;
    respond(state, result, mode)
}

/// Translate a dispatch result into the caller's response.
fn respond(
    state: &AppState,
    result: Result<serde_json::Value, DispatchError>,
    mode: RequestMode,
) -> Response {
    if let Err(e) = &result {
        if e.is_client_error() {
            debug!(%mode, "Rejected inbound request: {e}");
        } else {
            error!(%mode, "Proxy error: {e}");
        }
    }

    relay_response(relay(result, mode, state.settings.status_policy))
}
