//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the forward-header table only holds valid header names/values
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};

use crate::config::schema::ProxyConfig;
use crate::http::server::HEALTH_PATH;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be > 0"));
    }

    check_route(&mut errors, "proxy.prefix", &config.proxy.prefix);
    check_route(&mut errors, "proxy.redirect_path", &config.proxy.redirect_path);
    if config.proxy.prefix == config.proxy.redirect_path {
        errors.push(ValidationError::new(
            "proxy.redirect_path",
            "must differ from proxy.prefix",
        ));
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be > 0"));
    }
    if config.upstream.read_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.read_timeout_secs", "must be > 0"));
    }
    for (name, default) in &config.upstream.forward_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "upstream.forward_headers",
                format!("'{}' is not a valid header name", name),
            ));
        }
        if HeaderValue::from_str(default).is_err() {
            errors.push(ValidationError::new(
                "upstream.forward_headers",
                format!("default for '{}' is not a valid header value", name),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.static_files.enabled && config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::new("static_files.root", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(errors: &mut Vec<ValidationError>, field: &str, path: &str) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
    } else if path == "/" {
        errors.push(ValidationError::new(field, "must not be the root path"));
    } else if path.contains(['?', '#', '{', '}']) {
        errors.push(ValidationError::new(field, "must be a plain path"));
    } else if path == HEALTH_PATH {
        errors.push(ValidationError::new(field, "collides with the health endpoint"));
    }
}
