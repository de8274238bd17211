//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), CLI flags, PORT env
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → split into per-subsystem state at server construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    EndpointConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig,
    StaticFilesConfig, TimeoutConfig, UpstreamConfig,
};
