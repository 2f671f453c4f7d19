//! Authentication middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::AuthGate;

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    // "Bearer a b" carries no usable token: it is rejected as TOKEN_MISSING
    // before the verifier is consulted, not as TOKEN_INVALID.
    if parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Bearer token carried by the request headers, if any.
///
/// A missing, non-ASCII or non-bearer Authorization header counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token_from_header)
}

/// Authentication middleware.
///
/// Runs the [`AuthGate`] for every request on the layered routes. Admitted
/// requests carry a `RequestContext` in their extensions.
pub async fn auth_middleware(State(gate): State<AuthGate>, req: Request, next: Next) -> Response {
    gate.handle(req, |req| next.run(req)).await
}
