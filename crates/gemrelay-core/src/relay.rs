//! Translation from a dispatch outcome to a caller-facing response.
//!
//! This is the only place that decides status codes. Successful upstream
//! calls always relay as 200. Failures relay as 500 unless the policy says
//! to pass the upstream rejection status through.

use serde_json::Value;

use crate::domain::RequestMode;
use crate::error::{DispatchError, ErrorBody};

const STANDARD_ERROR: &str = "Proxy server error";
const STREAMING_ERROR: &str = "Stream proxy server error";
const INVALID_REQUEST_ERROR: &str = "Invalid request body";
const PAYLOAD_TOO_LARGE_ERROR: &str = "Request body too large";

/// How upstream rejection statuses are reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Collapse every failure to 500.
    #[default]
    Mask,
    /// Relay the upstream status for rejections; other failures stay 500.
    Preserve,
}

/// Status and JSON body to send back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Value,
}

/// Map a dispatch result to the response the caller receives.
pub fn relay(
    result: Result<Value, DispatchError>,
    mode: RequestMode,
    policy: StatusPolicy,
) -> RelayResponse {
    match result {
        Ok(body) => RelayResponse { status: 200, body },
        Err(err) => relay_error(&err, mode, policy),
    }
}

fn relay_error(err: &DispatchError, mode: RequestMode, policy: StatusPolicy) -> RelayResponse {
    let status = match (err, policy) {
        (DispatchError::InvalidRequest(_), _) => 400,
        (DispatchError::PayloadTooLarge(_), _) => 413,
        (DispatchError::Rejected { status, .. }, StatusPolicy::Preserve) if *status >= 400 => {
            *status
        }
        _ => 500,
    };

    let message = match err {
        DispatchError::InvalidRequest(_) => INVALID_REQUEST_ERROR,
        DispatchError::PayloadTooLarge(_) => PAYLOAD_TOO_LARGE_ERROR,
        _ if mode.is_streaming() => STREAMING_ERROR,
        _ => STANDARD_ERROR,
    };

    let body = ErrorBody::new(message, err.to_string()).with_upstream_status(err.upstream_status());

    RelayResponse {
        status,
        // ErrorBody only holds strings and an integer
        body: serde_json::to_value(body).unwrap_or(Value::Null),
    }
}
