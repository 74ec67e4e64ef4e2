//! Refresh token derivation.
//!
//! A refresh token is an opaque bearer secret: 160 bits, URL-safe base64
//! without padding, upper-cased. Two strategies produce it:
//!
//! - [`SaltedRefreshDeriver`] (default) hashes a fresh random UUID together
//!   with the access token. The output is not reproducible; knowing the
//!   access token does not let anyone guess the refresh token.
//! - [`KeyedRefreshDeriver`] computes HMAC-SHA1 of the access token under a
//!   server key. The output is a pure function of the access token, so a
//!   party holding the key can recompute and check it.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::AuthResult;
use crate::config::{RefreshConfig, RefreshStrategy};
use crate::error::AuthError;

/// Length of an encoded refresh token: 20 digest bytes, unpadded base64.
pub const REFRESH_TOKEN_LEN: usize = 27;

/// Produces a refresh token bound to a freshly issued access token.
pub trait RefreshTokenDeriver: Send + Sync + fmt::Debug {
    /// Derives a refresh token for `access_token`.
    ///
    /// # Errors
    /// Returns an error if derivation fails; the issuance call then fails
    /// as a whole.
    fn derive(&self, access_token: &str) -> AuthResult<String>;
}

/// Mixes a random UUID into a SHA-1 digest of the access token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaltedRefreshDeriver;

impl RefreshTokenDeriver for SaltedRefreshDeriver {
    fn derive(&self, access_token: &str) -> AuthResult<String> {
        let salt = Uuid::new_v4();

        let mut hasher = Sha1::new();
        hasher.update(salt.as_bytes());
        hasher.update(access_token.as_bytes());

        Ok(encode_refresh(&hasher.finalize()))
    }
}

/// HMAC-SHA1 of the access token under a server-held key.
#[derive(Clone)]
pub struct KeyedRefreshDeriver {
    key: Vec<u8>,
}

impl KeyedRefreshDeriver {
    /// Creates a deriver keyed with `key`.
    ///
    /// # Errors
    /// Returns a configuration error if the key is empty.
    pub fn new(key: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(AuthError::configuration("refresh key must not be empty"));
        }
        Ok(Self { key })
    }
}

impl RefreshTokenDeriver for KeyedRefreshDeriver {
    fn derive(&self, access_token: &str) -> AuthResult<String> {
        let mut mac = Hmac::<Sha1>::new_from_slice(&self.key)
            .map_err(|e| AuthError::internal(format!("refresh HMAC: {e}")))?;
        mac.update(access_token.as_bytes());

        Ok(encode_refresh(&mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for KeyedRefreshDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedRefreshDeriver")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Builds the deriver selected by `config`.
///
/// # Errors
/// Returns a configuration error if the keyed strategy has no key.
pub fn deriver_from_config(config: &RefreshConfig) -> AuthResult<Box<dyn RefreshTokenDeriver>> {
    match config.strategy {
        RefreshStrategy::Salted => Ok(Box::new(SaltedRefreshDeriver)),
        RefreshStrategy::Keyed => {
            let key = config
                .key
                .as_deref()
                .ok_or_else(|| AuthError::configuration("keyed refresh strategy needs a key"))?;
            Ok(Box::new(KeyedRefreshDeriver::new(key.as_bytes())?))
        }
    }
}

fn encode_refresh(digest: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(digest).to_uppercase()
}

/// Returns `true` if `token` has the shape of a refresh token.
#[must_use]
pub fn is_refresh_token_shaped(token: &str) -> bool {
    token.len() == REFRESH_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}
