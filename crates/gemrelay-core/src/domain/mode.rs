//! Standard vs streaming request classification.

use std::fmt;

/// Upstream method name for a single buffered generation call.
pub const STANDARD_OPERATION: &str = "generateContent";

/// Upstream method name for a streamed generation call.
pub const STREAMING_OPERATION: &str = "streamGenerateContent";

/// Which upstream generation method a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    #[default]
    Standard,
    Streaming,
}

impl RequestMode {
    /// Upstream operation segment (the part after `models/<id>:`).
    pub const fn operation(self) -> &'static str {
        match self {
            Self::Standard => STANDARD_OPERATION,
            Self::Streaming => STREAMING_OPERATION,
        }
    }

    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::Streaming)
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

/// Classify an inbound path.
///
/// Any path containing the streaming operation name is `Streaming`; all
/// other paths, including ones with no operation at all, are `Standard`.
pub fn classify_mode(path: &str) -> RequestMode {
    if path.contains(STREAMING_OPERATION) {
        RequestMode::Streaming
    } else {
        RequestMode::Standard
    }
}
