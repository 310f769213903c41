//! Nested JWT issuance and verification.
//!
//! Tokens are signed, then encrypted. The inner object is a standard RS256
//! JWS over [`TokenClaims`]; the outer object is a compact JWE
//! (`RSA-OAEP-256` key wrap + `A256GCM` content encryption) whose payload is
//! the entire inner JWS. Signing hides nothing, so encrypting the signed
//! token keeps subject and role opaque to anyone holding the string in
//! transit or in a log, while the inner signature still proves origin.
//!
//! Two independent RSA key pairs are held: [`SigningKeyPair`] and
//! [`EncryptionKeyPair`]. The service is stateless — no session table, no
//! revocation list — and every operation is a pure function of its inputs
//! and the current clock, so concurrent use needs no coordination.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use rsa::Oaep;
use rsa::rand_core::OsRng as RsaOsRng;
use serde::Deserialize;
use sha2::Sha256;
use std::borrow::Cow;
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::entities::user::Role;
use crate::domain::models::authenticated_user::AuthenticatedUser;
use crate::domain::models::token::{TokenClaims, TokenPair, TokenType};
use crate::utils::pem::{EncryptionKeyPair, KeyLoadError, SigningKeyPair};

/// JWE protected header values for the outer token.
const JWE_ALG: &str = "RSA-OAEP-256";
const JWE_ENC: &str = "A256GCM";

/// A256GCM parameters.
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;
const CEK_LEN: usize = 32;

/// Token verification/issuance failure.
///
/// All verification variants surface to HTTP clients uniformly as 401; the
/// distinction exists for logs and tests, not for callers on the wire.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("unexpected token type")]
    WrongTokenType,

    #[error("failed to build token: {0}")]
    Creation(String),
}

/// Wire-side view of the claims, decoded before the `typ` check.
///
/// `typ` is a plain optional string here: a token with the tag absent, or
/// holding a value outside access/refresh, must fail the type check as
/// [`TokenError::WrongTokenType`] — not blow up during deserialization.
#[derive(Deserialize)]
struct WireClaims {
    sub: String,
    role: Role,
    #[serde(default)]
    typ: Option<String>,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Structural shape of a presented token, decided by separator count before
/// any cryptography runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenShape {
    /// Five segments: signed-then-encrypted (JWE).
    Encrypted,
    /// Three segments: bare signed token (JWS). Kept for compatibility with
    /// tokens issued before the encrypting deployment.
    Bare,
    /// Anything else.
    Malformed,
}

/// Token issuer/verifier.
///
/// Construct once at startup via [`JwtService::from_config`]; all four keys
/// and both lifetimes are immutable afterwards and safe to share across
/// workers without locking.
pub struct JwtService {
    signing: SigningKeyPair,
    encryption: EncryptionKeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(
        signing: SigningKeyPair,
        encryption: EncryptionKeyPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            signing,
            encryption,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Load all four keys from the configured PEM files.
    pub fn from_config(config: &JwtConfig) -> Result<Self, KeyLoadError> {
        let signing =
            SigningKeyPair::from_pem_files(&config.sign.private_key, &config.sign.public_key)?;
        let encryption =
            EncryptionKeyPair::from_pem_files(&config.enc.private_key, &config.enc.public_key)?;
        Ok(Self::new(
            signing,
            encryption,
            Duration::seconds(config.access_ttl_secs),
            Duration::seconds(config.refresh_ttl_secs),
        ))
    }

    /// Lifetime of access tokens, in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Issue a token for `principal`.
    ///
    /// Builds fresh claims (`iat = now`, `exp = now + ttl`, random `jti`),
    /// signs them with the signing private key and encrypts the signed token
    /// under the encryption public key. The result is an opaque 5-segment
    /// compact string. No state is recorded anywhere.
    pub fn issue(
        &self,
        principal: &AuthenticatedUser,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = TokenClaims {
            sub: principal.id.to_string(),
            role: principal.role,
            typ: token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::RS256);
        let signed = encode(&header, &claims, &self.signing.encoding)
            .map_err(|e| TokenError::Creation(format!("signing failed: {e}")))?;

        self.encrypt_outer(&signed)
    }

    /// Issue an access/refresh pair for `principal`.
    pub fn issue_pair(&self, principal: &AuthenticatedUser) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(principal, TokenType::Access)?,
            refresh_token: self.issue(principal, TokenType::Refresh)?,
            expires_in: self.access_ttl_secs(),
        })
    }

    /// Verify `token` and return its claims.
    ///
    /// Steps, in order: classify the shape by separator count; decrypt the
    /// outer layer (falling back to treating the input as a bare JWS when
    /// decryption does not yield one — the compatibility path); verify the
    /// RS256 signature; require `exp` strictly in the future (no leeway);
    /// require the `typ` claim to equal `expected_type`.
    pub fn verify(
        &self,
        token: &str,
        expected_type: TokenType,
    ) -> Result<TokenClaims, TokenError> {
        let signed: Cow<'_, str> = match Self::classify(token) {
            TokenShape::Malformed => return Err(TokenError::Malformed),
            TokenShape::Bare => Cow::Borrowed(token),
            TokenShape::Encrypted => match self.decrypt_outer(token) {
                Ok(inner) => Cow::Owned(inner),
                Err(e) => {
                    log::debug!("outer token decryption failed ({e}), retrying as bare JWS");
                    Cow::Borrowed(token)
                }
            },
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;

        let data = decode::<WireClaims>(&signed, &self.signing.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    TokenError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        let raw = data.claims;
        if raw.typ.as_deref() != Some(expected_type.as_str()) {
            return Err(TokenError::WrongTokenType);
        }

        Ok(TokenClaims {
            sub: raw.sub,
            role: raw.role,
            typ: expected_type,
            iat: raw.iat,
            exp: raw.exp,
            jti: raw.jti,
        })
    }

    fn classify(token: &str) -> TokenShape {
        match token.bytes().filter(|&b| b == b'.').count() {
            4 => TokenShape::Encrypted,
            2 => TokenShape::Bare,
            _ => TokenShape::Malformed,
        }
    }

    /// Wrap a signed token into a compact JWE:
    /// `header.encrypted_key.iv.ciphertext.tag`, all base64url without padding.
    fn encrypt_outer(&self, signed: &str) -> Result<String, TokenError> {
        let header = serde_json::json!({
            "alg": JWE_ALG,
            "enc": JWE_ENC,
            "cty": "JWT",
        });
        let protected = URL_SAFE_NO_PAD.encode(header.to_string());

        // Fresh content key per token, wrapped under the encryption public key.
        let cek = Aes256Gcm::generate_key(&mut OsRng);
        let wrapped_key = self
            .encryption
            .public
            .encrypt(&mut RsaOsRng, Oaep::new::<Sha256>(), cek.as_slice())
            .map_err(|e| TokenError::Creation(format!("CEK wrap failed: {e}")))?;

        let cipher = Aes256Gcm::new(&cek);
        let iv = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut ciphertext = cipher
            .encrypt(
                &iv,
                Payload {
                    msg: signed.as_bytes(),
                    // The protected header is bound as AAD per RFC 7516.
                    aad: protected.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Creation("content encryption failed".to_string()))?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(format!(
            "{protected}.{}.{}.{}.{}",
            URL_SAFE_NO_PAD.encode(&wrapped_key),
            URL_SAFE_NO_PAD.encode(iv),
            URL_SAFE_NO_PAD.encode(&ciphertext),
            URL_SAFE_NO_PAD.encode(&tag),
        ))
    }

    /// Open a compact JWE and return the inner signed token string.
    fn decrypt_outer(&self, token: &str) -> Result<String, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 5 {
            return Err(TokenError::Malformed);
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(parts[0])
            .map_err(|_| TokenError::Malformed)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header["alg"] != JWE_ALG || header["enc"] != JWE_ENC {
            return Err(TokenError::Malformed);
        }

        let wrapped_key = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| TokenError::Malformed)?;
        let iv = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| TokenError::Malformed)?;
        let mut ciphertext = URL_SAFE_NO_PAD
            .decode(parts[3])
            .map_err(|_| TokenError::Malformed)?;
        let tag = URL_SAFE_NO_PAD
            .decode(parts[4])
            .map_err(|_| TokenError::Malformed)?;
        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return Err(TokenError::Malformed);
        }

        let cek = self
            .encryption
            .private
            .decrypt(Oaep::new::<Sha256>(), &wrapped_key)
            .map_err(|_| TokenError::Malformed)?;
        if cek.len() != CEK_LEN {
            return Err(TokenError::Malformed);
        }

        ciphertext.extend_from_slice(&tag);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&cek));
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: &ciphertext,
                    aad: parts[0].as_bytes(),
                },
            )
            .map_err(|_| TokenError::Malformed)?;

        String::from_utf8(plaintext).map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use once_cell::sync::Lazy;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    pub struct PemPair {
        pub private: String,
        pub public: String,
    }

    fn generate_pem_pair() -> PemPair {
        let private =
            RsaPrivateKey::new(&mut RsaOsRng, 2048).expect("RSA key generation failed");
        let public = private.to_public_key();
        PemPair {
            private: private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public: public.to_public_key_pem(LineEnding::LF).unwrap(),
        }
    }

    /// Key generation is expensive, so all tests in the binary share three
    /// pairs: signing, encryption, and a foreign signer.
    pub static SIGN_KEYS: Lazy<PemPair> = Lazy::new(generate_pem_pair);
    pub static ENC_KEYS: Lazy<PemPair> = Lazy::new(generate_pem_pair);
    pub static FOREIGN_SIGN_KEYS: Lazy<PemPair> = Lazy::new(generate_pem_pair);

    /// Build a service over the shared test keys with the given lifetimes.
    pub fn test_jwt_service(access_ttl: Duration, refresh_ttl: Duration) -> JwtService {
        JwtService::new(
            SigningKeyPair::from_pem(&SIGN_KEYS.private, &SIGN_KEYS.public).unwrap(),
            EncryptionKeyPair::from_pem(&ENC_KEYS.private, &ENC_KEYS.public).unwrap(),
            access_ttl,
            refresh_ttl,
        )
    }
}
