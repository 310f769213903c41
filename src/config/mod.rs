//! Environment-backed configuration.
//!
//! Configuration is read once at startup into plain immutable structs and
//! passed to service constructors. Nothing reads the environment after boot.

mod encryption_config;
mod jwt_config;

pub use encryption_config::EncryptionConfig;
pub use jwt_config::JwtConfig;

use thiserror::Error;

/// Startup configuration failure. Always fatal; there is no runtime recovery
/// from a missing secret or key path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Read a required environment variable.
pub(crate) fn require_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

/// Read an optional environment variable with a default.
pub(crate) fn var_or(name: &'static str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
