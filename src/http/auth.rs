//! Bearer credential gate.
//!
//! Validity of the credential is the hosting layer's concern; this only
//! checks that one was presented. The token itself is forwarded to the
//! store so row-level policies apply to the caller.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use std::time::Instant;

use crate::http::response::unauthorized;
use crate::http::routes::Route;
use crate::http::server::AppState;
use crate::observability::metrics;

/// The token from an `Authorization: Bearer <token>` header.
/// The scheme name is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a bearer credential when the gate is enabled.
/// Pre-flight probes always pass.
pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.require_bearer
        || request.method() == Method::OPTIONS
        || bearer_token(request.headers()).is_some()
    {
        return next.run(request).await;
    }

    let start = Instant::now();
    let route = Route::resolve(request.method(), request.uri().path(), &state.base_name);
    tracing::warn!(path = %request.uri().path(), "Request without bearer credential rejected");

    let response = unauthorized();
    metrics::record_request(route.label(), response.status().as_u16(), start);
    response
}
