//! Response payloads for the informational routes and relay conversion.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use gemrelay_core::{RelayResponse, SERVICE_NAME};

/// Message returned by `GET /`.
pub const ROOT_MESSAGE: &str = "Gemini Proxy Server is running!";

/// Response from `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: ROOT_MESSAGE.to_string(),
        }
    }
}

/// Response from `GET /healthz`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
}

impl HealthResponse {
    /// Health snapshot for the current instant.
    pub fn now() -> Self {
        Self {
            status: "OK".to_string(),
            service: SERVICE_NAME.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Convert a relayed result into an HTTP response.
pub fn relay_response(relayed: RelayResponse) -> Response {
    let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(relayed.body)).into_response()
}
