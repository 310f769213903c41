//! JWT key and lifetime configuration.

use super::{ConfigError, require_var, var_or};

/// Paths to one PEM-encoded RSA key pair.
#[derive(Debug, Clone)]
pub struct KeyPairPaths {
    pub private_key: String,
    pub public_key: String,
}

/// Token subsystem configuration.
///
/// Two independent RSA key pairs are configured: one for signing claims, one
/// for encrypting the signed token. Keeping them separate means a leak of one
/// key family defeats only one of authenticity/confidentiality, not both.
///
/// # Environment variables
///
/// ```bash
/// export JWT_SIGN_PRIVATE_KEY_PATH="./secrets/sign_private.pem"   # PKCS#8
/// export JWT_SIGN_PUBLIC_KEY_PATH="./secrets/sign_public.pem"     # X.509 SPKI
/// export JWT_ENC_PRIVATE_KEY_PATH="./secrets/enc_private.pem"
/// export JWT_ENC_PUBLIC_KEY_PATH="./secrets/enc_public.pem"
/// export JWT_ACCESS_TTL_SECS="900"       # default 15 minutes
/// export JWT_REFRESH_TTL_SECS="604800"   # default 7 days
/// ```
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub sign: KeyPairPaths,
    pub enc: KeyPairPaths,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtConfig {
    /// Load the token configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sign: KeyPairPaths {
                private_key: require_var("JWT_SIGN_PRIVATE_KEY_PATH")?,
                public_key: require_var("JWT_SIGN_PUBLIC_KEY_PATH")?,
            },
            enc: KeyPairPaths {
                private_key: require_var("JWT_ENC_PRIVATE_KEY_PATH")?,
                public_key: require_var("JWT_ENC_PUBLIC_KEY_PATH")?,
            },
            access_ttl_secs: parse_secs("JWT_ACCESS_TTL_SECS", "900")?,
            refresh_ttl_secs: parse_secs("JWT_REFRESH_TTL_SECS", "604800")?,
        })
    }
}

fn parse_secs(name: &'static str, default: &str) -> Result<i64, ConfigError> {
    var_or(name, default)
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        })
}
