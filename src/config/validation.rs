//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (workers >= 1, timeouts > 0)
//! - Reject unusable security settings (empty or short auth secret)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// Minimum length accepted for the token signing secret.
const MIN_SECRET_LEN: usize = 16;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "listener.bind_address").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Render a list of validation errors as a single line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a configuration, collecting every semantic error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.workers == 0 {
        errors.push(ValidationError::new("listener.workers", "must be at least 1"));
    }

    if config.database.url.is_empty() {
        errors.push(ValidationError::new("database.url", "must not be empty"));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::new(
            "database.max_connections",
            "must be at least 1",
        ));
    }

    if config.auth.secret.is_empty() {
        errors.push(ValidationError::new(
            "auth.secret",
            "must be set (or provided via the SECRET_KEY environment variable)",
        ));
    } else if config.auth.secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "auth.secret",
            format!("must be at least {} bytes", MIN_SECRET_LEN),
        ));
    }
    if config.auth.token_expiry_mins <= 0 {
        errors.push(ValidationError::new(
            "auth.token_expiry_mins",
            "must be positive",
        ));
    }
    if config.auth.bootstrap_username.is_empty() {
        errors.push(ValidationError::new(
            "auth.bootstrap_username",
            "must not be empty",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be positive"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if config.cors.allowed_origins.iter().any(String::is_empty) {
        errors.push(ValidationError::new(
            "cors.allowed_origins",
            "origins must not be empty strings",
        ));
    }

    if config.provision.service_user.is_empty() {
        errors.push(ValidationError::new(
            "provision.service_user",
            "must not be empty",
        ));
    }
    if config.provision.packages.iter().any(String::is_empty) {
        errors.push(ValidationError::new(
            "provision.packages",
            "package names must not be empty",
        ));
    }
    if config.provision.verify_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "provision.verify_timeout_secs",
            "must be positive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
