use crate::crypto::cipher::KEY_LEN;
use crate::errors::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::env;
use std::fmt;

/// Environment variable holding the base64-encoded AES-256 key.
const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Process-wide AES-256 key, decoded once at startup.
///
/// Construction is the only place key length is checked for configuration
/// purposes; a wrong-length or undecodable key is a fatal startup error, not
/// something to surface per request. `Debug` is redacted so the material
/// cannot leak through logging.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a base64-encoded key and verify its length.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|err| Error::InvalidEncryptionKey(format!("invalid base64: {err}")))?;
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            Error::InvalidEncryptionKey(format!(
                "key must be {KEY_LEN} bytes after base64 decoding, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Load the key from the `ENCRYPTION_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let encoded = env::var(ENCRYPTION_KEY_ENV).map_err(|_| {
            Error::InvalidEncryptionKey(format!("{ENCRYPTION_KEY_ENV} is not set"))
        })?;
        Self::from_base64(&encoded)
    }

    /// Raw key bytes for cipher calls.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}
