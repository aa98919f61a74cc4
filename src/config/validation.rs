//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Exactly one store connection scheme is active
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: JarConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{JarConfig, StoreBackend};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("store url and store host/port/password are mutually exclusive")]
    ConflictingStoreTarget,

    #[error("store url '{0}' is not a valid redis url")]
    InvalidStoreUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("store namespace must not be empty")]
    EmptyNamespace,
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &JarConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let store = &config.store;
    if store.backend == StoreBackend::Redis {
        if store.url.is_some() && store.uses_discrete_target() {
            errors.push(ValidationError::ConflictingStoreTarget);
        }
        if let Some(raw) = &store.url {
            let valid = url::Url::parse(raw)
                .map(|u| matches!(u.scheme(), "redis" | "rediss"))
                .unwrap_or(false);
            if !valid {
                errors.push(ValidationError::InvalidStoreUrl(raw.clone()));
            }
        }
        if store.port == Some(0) {
            errors.push(ValidationError::Zero("store.port"));
        }
    }

    if store.namespace.trim().is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }
    if store.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("store.connect_timeout_secs"));
    }
    if store.reconnect.max_attempts == 0 {
        errors.push(ValidationError::Zero("store.reconnect.max_attempts"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
