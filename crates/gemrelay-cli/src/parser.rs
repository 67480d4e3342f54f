//! Command-line parser.
//!
//! Every option can also come from the environment (and therefore from a
//! `.env` file loaded before parsing).

use std::time::Duration;

use clap::Parser;

use gemrelay_core::{
    ApiKey, DEFAULT_API_VERSION, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_MODEL, DEFAULT_PORT,
    DEFAULT_UPSTREAM_URL, RelaySettings, StatusPolicy, UpstreamEndpoint, validate_settings,
};

use crate::error::CliError;

/// Command-line interface for the Gemini proxy.
#[derive(Parser)]
#[command(name = "gemrelay")]
#[command(about = "Reverse proxy for the Gemini API with server-side key injection")]
#[command(version)]
pub struct Cli {
    /// Gemini API key injected into every upstream call
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "GEMRELAY_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Upstream base URL
    #[arg(long, env = "GEMRELAY_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Upstream API version path segment
    #[arg(long, env = "GEMRELAY_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Model used when a request path names none
    #[arg(long, env = "GEMRELAY_DEFAULT_MODEL", default_value = DEFAULT_MODEL)]
    pub default_model: String,

    /// Relay upstream error statuses instead of answering 500
    #[arg(long, env = "GEMRELAY_PRESERVE_UPSTREAM_STATUS")]
    pub preserve_upstream_status: bool,

    /// Forward streaming responses incrementally instead of buffering
    #[arg(long, env = "GEMRELAY_STREAM_PASSTHROUGH")]
    pub stream_passthrough: bool,

    /// Upstream request timeout in seconds (no timeout when unset)
    #[arg(long, env = "GEMRELAY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Largest inbound request body accepted, in bytes
    #[arg(long, env = "GEMRELAY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Convert parsed arguments into validated proxy settings.
    pub fn into_settings(self) -> Result<RelaySettings, CliError> {
        let status_policy = if self.preserve_upstream_status {
            StatusPolicy::Preserve
        } else {
            StatusPolicy::Mask
        };

        let settings = RelaySettings {
            host: self.host,
            port: self.port,
            api_key: ApiKey::new(self.api_key),
            endpoint: UpstreamEndpoint::new(self.upstream_url, self.api_version),
            default_model: self.default_model,
            status_policy,
            stream_passthrough: self.stream_passthrough,
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            max_body_bytes: self.max_body_bytes,
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}
