//! Business failures reported to API callers.

use thiserror::Error;

use crate::students::FieldError;

/// Detail shown alongside a duplicate-email failure.
pub const DUPLICATE_EMAIL_DETAIL: &str = "This email is already used by another student";

/// Every expected failure of a controller operation.
///
/// The `Display` text is the envelope's `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The candidate input broke one or more field rules.
    #[error("Invalid data")]
    ValidationFailed(Vec<FieldError>),

    /// The request path carried no student id.
    #[error("Student id is required")]
    MissingIdentifier,

    /// No student has the requested id. Carries the store's message.
    #[error("Student not found")]
    NotFound(String),

    /// Email uniqueness violated.
    #[error("Email already registered")]
    Conflict,

    /// Any other store failure, with the store's message verbatim.
    #[error("{context}")]
    StoreFailure {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// Text for the envelope's `error` field, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::ValidationFailed(_) | ApiError::MissingIdentifier => None,
            ApiError::NotFound(detail) => Some(detail.clone()),
            ApiError::Conflict => Some(DUPLICATE_EMAIL_DETAIL.to_string()),
            ApiError::StoreFailure { detail, .. } => Some(detail.clone()),
        }
    }
}
