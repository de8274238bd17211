//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides taken from the process environment.
pub fn apply_env_overrides(config: &mut ProxyConfig) {
    apply_port_override(config, std::env::var(PORT_ENV).ok().as_deref());
}

/// Replace the port of `listener.bind_address` with `port`, keeping the host.
///
/// Unparseable values are logged and ignored.
pub fn apply_port_override(config: &mut ProxyConfig, port: Option<&str>) {
    let Some(raw) = port else { return };
    let port = match raw.trim().parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            tracing::warn!(value = %raw, "Ignoring invalid {} override", PORT_ENV);
            return;
        }
    };

    config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    };
}
