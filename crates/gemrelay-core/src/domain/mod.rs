//! Request-level domain types.
//!
//! Everything here is derived from a single inbound request and lives only
//! for that request's duration.

pub mod body;
pub mod mode;
pub mod target;

pub use body::{LegacyRequest, legacy_upstream_body, parse_legacy_request, passthrough_body};
pub use mode::{RequestMode, STANDARD_OPERATION, STREAMING_OPERATION, classify_mode};
pub use target::{DEFAULT_MODEL, TargetIdentifier, extract_target_identifier};
