//! Target identifier extraction.
//!
//! The identifier is the model name embedded in an inbound path as
//! `models/<identifier>:<operation>`. It is not checked against any known
//! model list and ends up verbatim in the upstream URL path.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Fallback model used when a path carries no `models/<id>:` segment.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

static MODEL_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"models/([^:]+):").expect("model segment pattern is valid"));

/// Model/resource name the request is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetIdentifier(String);

impl TargetIdentifier {
    /// Wrap a raw identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the identifier from `models/<id>:` in `path`.
///
/// Returns `default` when the segment is absent or empty. The captured text
/// is used as-is: no character validation or escaping is applied.
pub fn extract_target_identifier(path: &str, default: &str) -> TargetIdentifier {
    MODEL_SEGMENT
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
        .map_or_else(|| TargetIdentifier::new(default), TargetIdentifier::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_model_from_generate_path() {
        let id = extract_target_identifier(
            "/v1beta/models/gemini-2.0-flash:generateContent",
            DEFAULT_MODEL,
        );
        assert_eq!(id.as_str(), "gemini-2.0-flash");
    }

    #[test]
    fn test_extracts_model_from_stream_path() {
        let id = extract_target_identifier(
            "/v1beta/models/gemini-1.5-pro:streamGenerateContent",
            DEFAULT_MODEL,
        );
        assert_eq!(id.as_str(), "gemini-1.5-pro");
    }

    #[test]
    fn test_missing_segment_uses_default() {
        for path in ["/", "/api/chat", "/models/no-colon", "/v1beta/generateContent"] {
            let id = extract_target_identifier(path, DEFAULT_MODEL);
            assert_eq!(id.as_str(), DEFAULT_MODEL, "path: {path}");
        }
    }

    #[test]
    fn test_custom_default() {
        let id = extract_target_identifier("/health", "gemini-pro");
        assert_eq!(id.as_str(), "gemini-pro");
    }

    #[test]
    fn test_identifier_is_not_sanitized() {
        // Whatever sits between `models/` and the colon is taken literally.
        let id = extract_target_identifier("/models/tuned/abc 123:generateContent", DEFAULT_MODEL);
        assert_eq!(id.as_str(), "tuned/abc 123");
    }

    #[test]
    fn test_first_match_wins() {
        let id = extract_target_identifier(
            "/models/first:generateContent/models/second:streamGenerateContent",
            DEFAULT_MODEL,
        );
        assert_eq!(id.to_string(), "first");
    }
}
