//! Request forwarding to the Gemini API.
//!
//! One POST per inbound request, no retries. The buffered path returns the
//! parsed JSON body for [`gemrelay_core::relay`]; the passthrough path hands
//! the upstream byte stream straight to the caller.

use std::error::Error as _;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use gemrelay_core::{DispatchError, UpstreamUrl};

/// Forward a body and wait for the complete upstream response.
///
/// # Errors
///
/// - `Transport` if upstream cannot be reached or the body cannot be read
/// - `Rejected` for any non-2xx status, carrying the raw response text
/// - `MalformedBody` if a 2xx body is not JSON
pub async fn forward_to_upstream(
    client: &Client,
    url: &UpstreamUrl,
    body: Bytes,
) -> Result<Value, DispatchError> {
    let response = send(client, url, body).await?;

    if !response.status().is_success() {
        return Err(rejection(response).await);
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| DispatchError::MalformedBody(e.to_string()))
}

/// Forward a body and relay the upstream response incrementally.
///
/// Only the success path streams; rejections are read in full and returned
/// as `Rejected` so the caller gets the usual error body.
pub async fn stream_from_upstream(
    client: &Client,
    url: &UpstreamUrl,
    body: Bytes,
) -> Result<Response, DispatchError> {
    let response = send(client, url, body).await?;

    if !response.status().is_success() {
        return Err(rejection(response).await);
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    // Body::from_stream needs an error type convertible to BoxError
    let stream = response.bytes_stream().map_err(std::io::Error::other);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no") // Disable nginx buffering
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

async fn send(
    client: &Client,
    url: &UpstreamUrl,
    body: Bytes,
) -> Result<reqwest::Response, DispatchError> {
    debug!(upstream = %url, bytes = body.len(), "Sending upstream request");

    client
        .post(url.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(transport_error)
}

async fn rejection(response: reqwest::Response) -> DispatchError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(text) => text,
        Err(e) => format!("<failed to read error body: {}>", error_chain(e)),
    };
    warn!(status, "Upstream rejected request");
    DispatchError::Rejected { status, body }
}

fn transport_error(err: reqwest::Error) -> DispatchError {
    DispatchError::Transport(error_chain(err))
}

/// Flatten a reqwest error and its sources into one message.
///
/// The URL is stripped first; it carries the API key.
fn error_chain(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
