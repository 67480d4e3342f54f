//! Outbound body shaping.
//!
//! The catch-all route forwards the inbound body untouched. The two legacy
//! routes accept a typed request and forward only the fields the upstream
//! operation needs; the model name travels in the URL instead.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::mode::RequestMode;
use super::target::TargetIdentifier;
use crate::error::DispatchError;

const EMPTY_OBJECT: &[u8] = b"{}";

/// An empty or whitespace-only body counts as no body at all.
fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

/// Validate an opaque inbound body for verbatim forwarding.
///
/// An empty (or whitespace-only) body becomes `{}`. Anything else must parse
/// as JSON but is otherwise passed through byte-for-byte.
pub fn passthrough_body(raw: Bytes) -> Result<Bytes, DispatchError> {
    if is_blank(&raw) {
        return Ok(Bytes::from_static(EMPTY_OBJECT));
    }

    serde_json::from_slice::<serde::de::IgnoredAny>(&raw)
        .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;

    Ok(raw)
}

/// Parse a legacy route body. A blank body is an empty request.
pub fn parse_legacy_request(raw: &[u8]) -> Result<LegacyRequest, DispatchError> {
    if is_blank(raw) {
        return Ok(LegacyRequest::default());
    }

    serde_json::from_slice(raw).map_err(|e| DispatchError::InvalidRequest(e.to_string()))
}

/// Request body accepted by `/api/gemini-proxy` and `/api/gemini-proxy-stream`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyRequest {
    /// Model to route to; any JSON scalar is accepted.
    #[serde(default)]
    pub model: Option<Value>,
    /// Conversation contents, forwarded as-is.
    #[serde(default)]
    pub contents: Option<Value>,
    /// Generation parameters (standard mode only).
    #[serde(default, rename = "generationConfig")]
    pub generation_config: Option<Value>,
}

impl LegacyRequest {
    /// Resolve the routing target from the body's `model` field.
    ///
    /// Strings are used as-is and numbers or booleans by their JSON text.
    /// Missing, null, empty, array and object values use `default`.
    pub fn target(&self, default: &str) -> TargetIdentifier {
        match &self.model {
            Some(Value::String(model)) if !model.is_empty() => TargetIdentifier::new(model.clone()),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
                TargetIdentifier::new(scalar.to_string())
            }
            _ => TargetIdentifier::new(default),
        }
    }
}

/// Build the upstream body for a legacy request.
///
/// Standard keeps `contents` and `generationConfig`; Streaming keeps only
/// `contents`. Absent fields are omitted rather than sent as `null`.
pub fn legacy_upstream_body(request: &LegacyRequest, mode: RequestMode) -> Value {
    let mut body = Map::new();

    if let Some(contents) = &request.contents {
        body.insert("contents".to_string(), contents.clone());
    }

    if mode == RequestMode::Standard
        && let Some(config) = &request.generation_config
    {
        body.insert("generationConfig".to_string(), config.clone());
    }

    Value::Object(body)
}
