//! Request spans for `TraceLayer`.
//!
//! `DefaultMakeSpan` records the full URI. The sign-in handoff carries the
//! access token in its query string, so spans here record the path only.

use axum::{body::Body, http::Request};
use tracing::Span;

use super::request_id::REQUEST_ID_HEADER;

/// Span for one request: method, path, version and request id.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
        request_id,
    )
}
