//! Field encryption configuration.

use super::{ConfigError, require_var};

/// Symmetric key configuration for the card-number field cipher.
///
/// The key is supplied as standard base64 and must decode to exactly 32 bytes
/// (AES-256). A missing key is a startup error, never a runtime one.
///
/// # Environment variables
///
/// ```bash
/// # openssl rand -base64 32
/// export ENCRYPTION_KEY="base64-encoded-32-byte-key"
/// ```
#[derive(Debug, Clone)]
pub struct EncryptionConfig {
    pub key_base64: String,
}

impl EncryptionConfig {
    /// Load the field encryption configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_base64: require_var("ENCRYPTION_KEY")?,
        })
    }
}
