//! Configuration validation.
//!
//! Semantic checks run after serde has parsed the file. Every problem is
//! reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{AppConfig, StoreBackend};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.api.base_path.trim_matches('/').is_empty() {
        errors.push(ValidationError::new("api.base_path", "must not be empty"));
    }

    if config.api.max_body_size == 0 {
        errors.push(ValidationError::new("api.max_body_size", "must be greater than zero"));
    }

    if config.store.backend == StoreBackend::Postgrest {
        if config.store.url.is_empty() {
            errors.push(ValidationError::new(
                "store.url",
                "required for the postgrest backend (or set SUPABASE_URL)",
            ));
        } else if url::Url::parse(&config.store.url).is_err() {
            errors.push(ValidationError::new(
                "store.url",
                format!("'{}' is not a valid URL", config.store.url),
            ));
        }

        if config.store.api_key.is_empty() {
            errors.push(ValidationError::new(
                "store.api_key",
                "required for the postgrest backend (or set SUPABASE_ANON_KEY)",
            ));
        }

        if config.store.table.is_empty() {
            errors.push(ValidationError::new("store.table", "must not be empty"));
        }
    }

    if config.store.timeout_secs == 0 {
        errors.push(ValidationError::new("store.timeout_secs", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
