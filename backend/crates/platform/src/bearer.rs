//! Bearer Token Extraction
//!
//! Parses `Authorization: Bearer <token>` (RFC 6750). The scheme name is
//! matched case-insensitively; the token itself is returned untouched.

use http::HeaderMap;
use http::header::AUTHORIZATION;

const SCHEME: &str = "bearer";

/// Extract the token from a raw `Authorization` header value
///
/// Returns `None` for other schemes or an empty token.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Raw `Authorization` header value, if present and valid ASCII
pub fn authorization_value(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
