//! Exact-match origin allow-list and the CORS negotiation rules for the
//! contact endpoint. Disallowed origins are refused with 403 on actual
//! requests but still get a 204 on preflight.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// Ordered list of origins permitted to call the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }

    /// Parse a comma-separated list, trimming each entry. Empty entries are
    /// dropped so that an absent `Origin` header never matches.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        !origin.is_empty() && self.0.iter().any(|o| o == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Headers for a preflight response. The allow-origin header is only
    /// echoed for allowed origins; methods and headers are always sent.
    pub fn preflight_headers(&self, origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.is_allowed(origin)
            && let Ok(value) = HeaderValue::from_str(origin)
        {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers
    }

    /// Headers for an actual request. `None` means the origin is refused.
    pub fn request_headers(&self, origin: &str) -> Option<HeaderMap> {
        if !self.is_allowed(origin) {
            return None;
        }
        let value = HeaderValue::from_str(origin).ok()?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(VARY, HeaderValue::from_static("Origin"));
        Some(headers)
    }
}
