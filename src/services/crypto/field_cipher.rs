//! Authenticated field encryption for persisted card numbers.
//!
//! The persistence layer stores card numbers through this codec so they are
//! unreadable at rest but recoverable for display. Each value is encrypted
//! with AES-256-GCM under a process-wide key and a fresh random 96-bit nonce;
//! the stored blob is `base64(nonce ‖ ciphertext ‖ tag)`. Re-encrypting the
//! same plaintext always produces a different blob.
//!
//! Decryption fails closed: a tampered blob, a truncated blob or the wrong
//! key yields [`FieldCipherError::DecryptionFailed`], never garbage plaintext.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Nonce length prefixed to every blob.
const NONCE_LEN: usize = 12;

/// AES key length (AES-256).
const KEY_LEN: usize = 32;

/// Field codec failure.
#[derive(Debug, Error)]
pub enum FieldCipherError {
    /// The configured key is not valid base64 or not 32 bytes. Startup-fatal.
    #[error("invalid field encryption key: {0}")]
    InvalidKey(String),

    #[error("field encryption failed")]
    EncryptionFailed,

    /// Tag mismatch, malformed blob, or wrong key. Surfaced to clients as a
    /// storage read error, never silently masked.
    #[error("field decryption failed")]
    DecryptionFailed,
}

/// AES-256-GCM codec over a single process-wide key.
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Build the codec from a standard-base64 encoded 32-byte key.
    pub fn from_base64_key(key_base64: &str) -> Result<Self, FieldCipherError> {
        let key_bytes = STANDARD
            .decode(key_base64)
            .map_err(|e| FieldCipherError::InvalidKey(e.to_string()))?;
        if key_bytes.len() != KEY_LEN {
            return Err(FieldCipherError::InvalidKey(format!(
                "expected {KEY_LEN}-byte key, got {} bytes",
                key_bytes.len()
            )));
        }
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes)),
        })
    }

    /// Encrypt a field value. `None` passes through unencrypted as `None`.
    pub fn encrypt(&self, plaintext: Option<&str>) -> Result<Option<String>, FieldCipherError> {
        let Some(plaintext) = plaintext else {
            return Ok(None);
        };

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| FieldCipherError::EncryptionFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(Some(STANDARD.encode(blob)))
    }

    /// Decrypt a stored blob. `None` passes through as `None`.
    pub fn decrypt(&self, blob: Option<&str>) -> Result<Option<String>, FieldCipherError> {
        let Some(blob) = blob else {
            return Ok(None);
        };

        let bytes = STANDARD
            .decode(blob)
            .map_err(|_| FieldCipherError::DecryptionFailed)?;
        if bytes.len() < NONCE_LEN {
            return Err(FieldCipherError::DecryptionFailed);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| FieldCipherError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| FieldCipherError::DecryptionFailed)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        // 32 zero bytes, base64-encoded. Fixed key keeps the tamper tests
        // deterministic.
        let key = STANDARD.encode([0u8; 32]);
        FieldCipher::from_base64_key(&key).unwrap()
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            FieldCipher::from_base64_key("%%%"),
            Err(FieldCipherError::InvalidKey(_))
        ));
        let short = STANDARD.encode([0u8; 16]);
        assert!(matches!(
            FieldCipher::from_base64_key(&short),
            Err(FieldCipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn round_trips_card_number() {
        let c = cipher();
        let blob = c.encrypt(Some("4111111111111111")).unwrap().unwrap();
        assert_eq!(
            c.decrypt(Some(&blob)).unwrap().unwrap(),
            "4111111111111111"
        );
    }

    #[test]
    fn round_trips_edge_case_strings() {
        let c = cipher();
        for value in ["", "a", "карта 💳 №1", "\u{0}\u{1}binary-ish"] {
            let blob = c.encrypt(Some(value)).unwrap().unwrap();
            assert_eq!(c.decrypt(Some(&blob)).unwrap().unwrap(), value);
        }
    }

    #[test]
    fn none_passes_through() {
        let c = cipher();
        assert_eq!(c.encrypt(None).unwrap(), None);
        assert_eq!(c.decrypt(None).unwrap(), None);
    }

    #[test]
    fn same_plaintext_yields_distinct_blobs() {
        let c = cipher();
        let a = c.encrypt(Some("4111111111111111")).unwrap().unwrap();
        let b = c.encrypt(Some("4111111111111111")).unwrap().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn any_single_byte_flip_fails_closed() {
        let c = cipher();
        let blob = c.encrypt(Some("4111111111111111")).unwrap().unwrap();
        let mut raw = STANDARD.decode(&blob).unwrap();

        for i in 0..raw.len() {
            raw[i] ^= 0x01;
            let tampered = STANDARD.encode(&raw);
            assert!(
                matches!(
                    c.decrypt(Some(&tampered)),
                    Err(FieldCipherError::DecryptionFailed)
                ),
                "flip at byte {i} was not rejected"
            );
            raw[i] ^= 0x01;
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let blob = cipher().encrypt(Some("secret")).unwrap().unwrap();

        let other_key = STANDARD.encode([7u8; 32]);
        let other = FieldCipher::from_base64_key(&other_key).unwrap();
        assert!(matches!(
            other.decrypt(Some(&blob)),
            Err(FieldCipherError::DecryptionFailed)
        ));
    }

    #[test]
    fn truncated_blob_fails_closed() {
        let c = cipher();
        for garbage in ["", "AAAA", "not base64 !!!"] {
            assert!(matches!(
                c.decrypt(Some(garbage)),
                Err(FieldCipherError::DecryptionFailed)
            ));
        }
    }
}
