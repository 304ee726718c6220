//! `Authorization: Bearer <token>` parsing shared by the cron route and the
//! admin API.

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// The token from an `Authorization: Bearer` header, if present and
/// non-empty. The scheme is matched case-insensitively.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
