//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0)
//! - Check paths are usable (non-empty templates, absolute socket)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::ControllerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.templates.virtual_server_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("templates.virtual_server_path", "must not be empty"));
    }
    if config.templates.transport_server_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("templates.transport_server_path", "must not be empty"));
    }

    if config.verify.timeout_ms == 0 {
        errors.push(ValidationError::new("verify.timeout_ms", "must be greater than 0"));
    }
    if !config.verify.socket_path.is_absolute() {
        errors.push(ValidationError::new(
            "verify.socket_path",
            format!("must be an absolute path, got {:?}", config.verify.socket_path),
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
