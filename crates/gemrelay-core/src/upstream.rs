//! Upstream endpoint and URL construction.
//!
//! The outbound URL has the shape
//! `{base}/{version}/models/{identifier}:{operation}?key={credential}`.
//! The identifier is inserted without escaping; the credential is
//! query-encoded and redacted whenever the URL is displayed.

use std::fmt;

use url::Url;

use crate::domain::{RequestMode, TargetIdentifier};
use crate::error::DispatchError;

/// Default upstream host.
pub const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Query parameter carrying the credential.
const KEY_PARAM: &str = "key";

const REDACTED: &str = "***";

/// Server-side credential injected into every upstream call.
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential. Only the URL builder should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({REDACTED})")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Where upstream calls are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoint {
    /// Scheme + host (+ optional port), e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// API version segment, e.g. `v1beta`.
    pub api_version: String,
}

impl Default for UpstreamEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl UpstreamEndpoint {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: api_version.into(),
        }
    }
}

/// A fully built upstream URL including the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamUrl(Url);

impl UpstreamUrl {
    /// The URL to send the request to. Contains the credential.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Append caller-supplied query parameters.
    ///
    /// A caller-supplied `key` is dropped so the server credential cannot be
    /// overridden.
    #[must_use]
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        {
            let mut query = self.0.query_pairs_mut();
            for (name, value) in pairs {
                if name.as_ref() != KEY_PARAM {
                    query.append_pair(name.as_ref(), value.as_ref());
                }
            }
        }
        self
    }

    /// Copy of the URL with the credential replaced, safe for logs.
    pub fn redacted(&self) -> String {
        let mut url = self.0.clone();
        let pairs: Vec<(String, String)> = self
            .0
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == KEY_PARAM {
                    REDACTED.to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();

        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

impl fmt::Debug for UpstreamUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpstreamUrl({})", self.redacted())
    }
}

impl fmt::Display for UpstreamUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Compose the upstream URL for a target and mode.
pub fn build_upstream_url(
    endpoint: &UpstreamEndpoint,
    identifier: &TargetIdentifier,
    mode: RequestMode,
    key: &ApiKey,
) -> Result<UpstreamUrl, DispatchError> {
    let base = endpoint.base_url.trim_end_matches('/');
    let version = endpoint.api_version.trim_matches('/');
    let raw = format!(
        "{base}/{version}/models/{identifier}:{operation}",
        operation = mode.operation()
    );

    let mut url = Url::parse(&raw).map_err(|e| DispatchError::InvalidUpstreamUrl(e.to_string()))?;
    url.query_pairs_mut().append_pair(KEY_PARAM, key.expose());

    Ok(UpstreamUrl(url))
}
