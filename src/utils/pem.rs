//! Key material loading.
//!
//! Parses PEM-encoded RSA key pairs into the typed handles the token service
//! is built from. Private keys are unencrypted PKCS#8 ("BEGIN PRIVATE KEY"),
//! public keys X.509 SPKI ("BEGIN PUBLIC KEY"):
//!
//! ```bash
//! openssl genpkey -algorithm RSA -pkeyopt rsa_keygen_bits:2048 -out private.pem
//! openssl pkey -in private.pem -pubout -out public.pem
//! ```
//!
//! Any failure here is fatal: the token service cannot be constructed without
//! its keys, so `main` propagates the error and the process does not start.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs;
use thiserror::Error;

/// Startup-only key loading failure. No retry, no recovery.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("failed to read key file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key material in '{path}': {reason}")]
    InvalidKey { path: String, reason: String },
}

/// Load an unencrypted PKCS#8 RSA private key from a PEM file.
pub fn load_rsa_private_key(path: &str) -> Result<RsaPrivateKey, KeyLoadError> {
    let pem = read_pem(path)?;
    RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| KeyLoadError::InvalidKey {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Load an X.509 SPKI RSA public key from a PEM file.
pub fn load_rsa_public_key(path: &str) -> Result<RsaPublicKey, KeyLoadError> {
    let pem = read_pem(path)?;
    RsaPublicKey::from_public_key_pem(&pem).map_err(|e| KeyLoadError::InvalidKey {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn read_pem(path: &str) -> Result<String, KeyLoadError> {
    fs::read_to_string(path).map_err(|source| KeyLoadError::Io {
        path: path.to_string(),
        source,
    })
}

/// RSA key pair used exclusively for signing claims (RS256).
///
/// Distinct from [`EncryptionKeyPair`] so that signing with the encryption
/// key — or vice versa — is a type error, not a runtime surprise.
pub struct SigningKeyPair {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl SigningKeyPair {
    /// Build a signing pair from PEM strings.
    ///
    /// The keys are parsed with the `rsa` crate first so that non-RSA or
    /// corrupt material is rejected with a precise error before being handed
    /// to `jsonwebtoken`.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyLoadError> {
        RsaPrivateKey::from_pkcs8_pem(private_pem).map_err(|e| KeyLoadError::InvalidKey {
            path: "<signing private key>".to_string(),
            reason: e.to_string(),
        })?;
        RsaPublicKey::from_public_key_pem(public_pem).map_err(|e| KeyLoadError::InvalidKey {
            path: "<signing public key>".to_string(),
            reason: e.to_string(),
        })?;

        let encoding =
            EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
                KeyLoadError::InvalidKey {
                    path: "<signing private key>".to_string(),
                    reason: e.to_string(),
                }
            })?;
        let decoding =
            DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
                KeyLoadError::InvalidKey {
                    path: "<signing public key>".to_string(),
                    reason: e.to_string(),
                }
            })?;

        Ok(Self { encoding, decoding })
    }

    /// Build a signing pair from PEM files on disk.
    pub fn from_pem_files(private_path: &str, public_path: &str) -> Result<Self, KeyLoadError> {
        let private_pem = read_pem(private_path)?;
        let public_pem = read_pem(public_path)?;
        Self::from_pem(&private_pem, &public_pem)
    }
}

/// RSA key pair used exclusively for wrapping token content keys
/// (RSA-OAEP-256).
pub struct EncryptionKeyPair {
    pub(crate) private: RsaPrivateKey,
    pub(crate) public: RsaPublicKey,
}

impl EncryptionKeyPair {
    /// Build an encryption pair from PEM strings.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyLoadError> {
        let private =
            RsaPrivateKey::from_pkcs8_pem(private_pem).map_err(|e| KeyLoadError::InvalidKey {
                path: "<encryption private key>".to_string(),
                reason: e.to_string(),
            })?;
        let public =
            RsaPublicKey::from_public_key_pem(public_pem).map_err(|e| KeyLoadError::InvalidKey {
                path: "<encryption public key>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { private, public })
    }

    /// Build an encryption pair from PEM files on disk.
    pub fn from_pem_files(private_path: &str, public_path: &str) -> Result<Self, KeyLoadError> {
        let private = load_rsa_private_key(private_path)?;
        let public = load_rsa_public_key(public_path)?;
        Ok(Self { private, public })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    fn generate_pem_pair() -> (String, String) {
        let private = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 2048)
            .expect("RSA key generation failed");
        let public = private.to_public_key();
        (
            private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public.to_public_key_pem(LineEnding::LF).unwrap(),
        )
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_rsa_private_key("/nonexistent/key.pem").unwrap_err();
        assert!(matches!(err, KeyLoadError::Io { .. }));
    }

    #[test]
    fn garbage_pem_is_invalid_key() {
        let dir = std::env::temp_dir().join("card_auth_service_pem_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.pem");
        std::fs::write(&path, "not a pem at all").unwrap();

        let err = load_rsa_private_key(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, KeyLoadError::InvalidKey { .. }));
    }

    #[test]
    fn round_trips_generated_keys() {
        let (private_pem, public_pem) = generate_pem_pair();

        let dir = std::env::temp_dir().join("card_auth_service_pem_test");
        std::fs::create_dir_all(&dir).unwrap();
        let private_path = dir.join("private.pem");
        let public_path = dir.join("public.pem");
        std::fs::write(&private_path, &private_pem).unwrap();
        std::fs::write(&public_path, &public_pem).unwrap();

        load_rsa_private_key(private_path.to_str().unwrap()).unwrap();
        load_rsa_public_key(public_path.to_str().unwrap()).unwrap();
        SigningKeyPair::from_pem(&private_pem, &public_pem).unwrap();
        EncryptionKeyPair::from_pem(&private_pem, &public_pem).unwrap();
    }

    #[test]
    fn public_pem_is_not_a_private_key() {
        let (_, public_pem) = generate_pem_pair();
        assert!(matches!(
            SigningKeyPair::from_pem(&public_pem, &public_pem),
            Err(KeyLoadError::InvalidKey { .. })
        ));
    }
}
