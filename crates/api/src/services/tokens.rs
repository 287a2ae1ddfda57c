//! API token generation and hashing.
//!
//! Only `HMAC-SHA256(pepper, token)` is stored, hex-encoded. A leaked table
//! cannot be replayed without the pepper held in configuration.

use std::fmt;

use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a generated token in bytes before hex encoding.
const TOKEN_BYTES: usize = 32;

/// The pepper could not be used as an HMAC key.
#[derive(Debug, thiserror::Error)]
#[error("invalid token pepper: {0}")]
pub struct TokenHasherError(#[from] hmac::digest::InvalidLength);

/// Hashes bearer tokens with a keyed HMAC.
#[derive(Clone)]
pub struct TokenHasher {
    mac: HmacSha256,
}

impl TokenHasher {
    /// # Errors
    ///
    /// Returns [`TokenHasherError`] if the pepper is rejected as a key.
    pub fn new(pepper: &SecretString) -> Result<Self, TokenHasherError> {
        let mac = HmacSha256::new_from_slice(pepper.expose_secret().as_bytes())?;
        Ok(Self { mac })
    }

    /// Hex-encoded digest of `token`.
    #[must_use]
    pub fn hash(&self, token: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}

/// A fresh random API token, hex-encoded.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
