//! Runtime settings and validation.
//!
//! Settings are assembled once at startup and shared read-only by every
//! request. Nothing reads the environment after this point.

use std::time::Duration;

use crate::domain::DEFAULT_MODEL;
use crate::relay::StatusPolicy;
use crate::upstream::{ApiKey, UpstreamEndpoint};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default cap on inbound request bodies (inline media can be large).
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "gemrelay";

/// Proxy settings.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Address to bind.
    pub host: String,
    /// Port to bind (0 for auto-assign).
    pub port: u16,
    /// Credential injected into every upstream URL.
    pub api_key: ApiKey,
    /// Upstream host and API version.
    pub endpoint: UpstreamEndpoint,
    /// Model used when a path names none.
    pub default_model: String,
    /// Whether upstream rejection statuses reach the caller.
    pub status_policy: StatusPolicy,
    /// Forward streaming responses chunk-by-chunk instead of buffering.
    pub stream_passthrough: bool,
    /// Per-request upstream timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Largest inbound body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl RelaySettings {
    /// Settings with defaults for everything except the credential.
    pub fn with_defaults(api_key: ApiKey) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key,
            endpoint: UpstreamEndpoint::default(),
            default_model: DEFAULT_MODEL.to_string(),
            status_policy: StatusPolicy::default(),
            stream_passthrough: false,
            request_timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("API key is required (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Default model cannot be empty")]
    EmptyDefaultModel,

    #[error("Upstream URL must start with http:// or https://, got {0}")]
    InvalidUpstreamUrl(String),

    #[error("API version cannot be empty")]
    EmptyApiVersion,

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Body size limit must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate settings values.
pub fn validate_settings(settings: &RelaySettings) -> Result<(), SettingsError> {
    if settings.api_key.is_empty() {
        return Err(SettingsError::MissingApiKey);
    }

    if settings.default_model.trim().is_empty() {
        return Err(SettingsError::EmptyDefaultModel);
    }

    let base = &settings.endpoint.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(SettingsError::InvalidUpstreamUrl(base.clone()));
    }

    if settings.endpoint.api_version.trim_matches('/').trim().is_empty() {
        return Err(SettingsError::EmptyApiVersion);
    }

    if settings.request_timeout.is_some_and(|t| t.is_zero()) {
        return Err(SettingsError::ZeroTimeout);
    }

    if settings.max_body_bytes == 0 {
        return Err(SettingsError::ZeroBodyLimit);
    }

    Ok(())
}
