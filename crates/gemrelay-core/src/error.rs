//! Dispatch error taxonomy.
//!
//! Every way a single request can fail is one variant here. The HTTP
//! adapter never builds failure responses by hand; it hands the error to
//! [`crate::relay::relay`].

use serde::Serialize;
use thiserror::Error;

/// Failure of a single dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The inbound body could not be used (not JSON, wrong shape).
    #[error("{0}")]
    InvalidRequest(String),

    /// The inbound body exceeded the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The upstream URL could not be assembled from the target identifier.
    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    /// Network-level failure reaching upstream (DNS, connect, TLS, reset).
    #[error("{0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Upstream answered 2xx but the body was not valid JSON.
    #[error("{0}")]
    MalformedBody(String),
}

impl DispatchError {
    /// Status code reported by upstream, when there was one.
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never reached a point where upstream was called.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::PayloadTooLarge(_))
    }
}

/// JSON body returned to callers on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Generic, caller-facing message.
    pub error: String,
    /// Failure detail (transport message, upstream status and text, parse error).
    pub details: String,
    /// Original upstream status for rejections.
    #[serde(rename = "upstreamStatus", skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            upstream_status: None,
        }
    }

    #[must_use]
    pub fn with_upstream_status(mut self, status: Option<u16>) -> Self {
        self.upstream_status = status;
        self
    }
}
