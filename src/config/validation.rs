//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject an empty or ambiguous instance pool
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one relay instance must be configured")]
    EmptyInstancePool,

    #[error("instance host '{0}' is listed more than once")]
    DuplicateHost(String),

    #[error("instance host '{0}' is not a bare hostname")]
    InvalidHost(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("health check path '{0}' must start with '/'")]
    InvalidHealthPath(String),

    #[error("unsupported scheme '{0}' (expected http or https)")]
    InvalidScheme(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.instances.is_empty() {
        errors.push(ValidationError::EmptyInstancePool);
    }

    let mut seen = HashSet::new();
    for instance in &config.instances {
        if !is_bare_host(&instance.host) {
            errors.push(ValidationError::InvalidHost(instance.host.clone()));
        }
        if !seen.insert(instance.host.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateHost(instance.host.clone()));
        }
    }

    let positive = [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_ms", config.health_check.timeout_ms),
        ("health_check.history_window", config.health_check.history_window as u64),
        ("circuit_breaker.max_failures", config.circuit_breaker.max_failures as u64),
        ("circuit_breaker.blacklist_secs", config.circuit_breaker.blacklist_secs),
        ("loader.attempt_timeout_ms", config.loader.attempt_timeout_ms),
        ("embed.timeout_ms", config.embed.timeout_ms),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(config.health_check.path.clone()));
    }

    if !matches!(config.loader.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(config.loader.scheme.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A host is usable when it forms a valid URL authority on its own.
fn is_bare_host(host: &str) -> bool {
    if host.is_empty() || host.contains(['/', '?', '#', '@']) || host.chars().any(char::is_whitespace) {
        return false;
    }
    url::Url::parse(&format!("https://{}/", host))
        .map(|u| u.host_str().is_some())
        .unwrap_or(false)
}
