#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod relay;
pub mod settings;
pub mod upstream;

// Re-export commonly used types for convenience
pub use domain::{
    DEFAULT_MODEL, LegacyRequest, RequestMode, STREAMING_OPERATION, STANDARD_OPERATION,
    TargetIdentifier, classify_mode, extract_target_identifier, legacy_upstream_body,
    parse_legacy_request, passthrough_body,
};
pub use error::{DispatchError, ErrorBody};
pub use relay::{RelayResponse, StatusPolicy, relay};
pub use settings::{
    DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, RelaySettings, SERVICE_NAME, SettingsError, validate_settings,
};
pub use upstream::{
    ApiKey, DEFAULT_API_VERSION, DEFAULT_UPSTREAM_URL, UpstreamEndpoint, UpstreamUrl,
    build_upstream_url,
};
