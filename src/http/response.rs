//! Response shaping.
//!
//! # Responsibilities
//! - Serialize envelopes as JSON with the matching status code
//! - Build the fixed responses (pre-flight, method not allowed, 401, 500)
//! - Define the cross-origin headers added to every response
//!
//! # Design Decisions
//! - `success: true` → 200, `success: false` → 400, including not-found
//! - Failures escaping the controller become a 500 envelope carrying the
//!   captured error text

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;

use crate::api::Envelope;
use crate::store::StoreError;

/// Headers browsers may send on cross-origin calls.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn allow_origin_value() -> HeaderValue {
    HeaderValue::from_static("*")
}

pub fn allow_headers_value() -> HeaderValue {
    HeaderValue::from_static(ALLOWED_HEADERS)
}

/// Failures that escape the controller.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

/// Answer to a CORS pre-flight probe.
pub fn preflight() -> Response {
    (StatusCode::OK, Body::empty()).into_response()
}

pub fn method_not_allowed() -> Response {
    Envelope::<()>::failure("Method not allowed").into_response()
}

pub fn unauthorized() -> Response {
    let envelope = Envelope::<()>::failure("Authentication required")
        .with_error("Missing bearer credential");
    (StatusCode::UNAUTHORIZED, Json(envelope)).into_response()
}

pub fn internal_error(err: &RequestError) -> Response {
    internal_failure(err.to_string())
}

/// 500 envelope for a panic caught at the router boundary.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(error = %detail, "Request handler panicked");
    internal_failure(detail)
}

fn internal_failure(detail: String) -> Response {
    let envelope = Envelope::<()>::failure("Internal server error").with_error(detail);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
}
