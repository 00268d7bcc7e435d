//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (work duration > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `timeouts.request_secs` (one year).
pub const MAX_REQUEST_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("timeouts.request_secs {0} exceeds the maximum of {max}", max = MAX_REQUEST_SECS)]
    RequestTimeoutTooLarge(u64),

    #[error("hello.work_ms must be greater than zero")]
    ZeroWork,

    #[error("pages.data_dir must not be empty")]
    EmptyDataDir,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }

    if config.timeouts.request_secs > MAX_REQUEST_SECS {
        errors.push(ValidationError::RequestTimeoutTooLarge(
            config.timeouts.request_secs,
        ));
    }

    if config.hello.work_ms == 0 {
        errors.push(ValidationError::ZeroWork);
    }

    if config.pages.enabled && config.pages.data_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDataDir);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.hello.work_ms = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::LogLevel("loud".into()),
                ValidationError::ZeroWork,
            ]
        );
    }

    #[test]
    fn request_timeout_is_bounded() {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = MAX_REQUEST_SECS;
        assert!(validate_config(&config).is_ok());

        config.timeouts.request_secs = u64::MAX;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestTimeoutTooLarge(u64::MAX)])
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nope".into())])
        );
    }
}
