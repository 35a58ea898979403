//! Uniform response envelope.
//!
//! Every response body, success or failure, has the same shape:
//! `{ success, message, data?, total?, errors?, error? }`. Absent parts are
//! omitted from the JSON.

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::students::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Number of records in `data`, for list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    /// Field-level validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,

    /// Underlying failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::done(message)
        }
    }

    /// A successful envelope with no payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            total: None,
            errors: None,
            error: None,
        }
    }

    /// A failed envelope with only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::done(message)
        }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl<T> From<ApiError> for Envelope<T> {
    fn from(err: ApiError) -> Self {
        let mut envelope = Self::failure(err.to_string());
        envelope.error = err.detail();
        if let ApiError::ValidationFailed(errors) = err {
            envelope.errors = Some(errors);
        }
        envelope
    }
}
