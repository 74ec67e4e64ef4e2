//! Token issuance configuration.
//!
//! This module provides configuration types for signing, token lifetimes,
//! refresh token strategy and scope policy.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::token::SigningAlgorithm;

/// Root configuration for token issuance.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.signing]
/// algorithm = "ES384"
/// key_file = "/etc/tessera/signing.pem"
///
/// [auth.token]
/// access_token_lifetime = "15m"
/// issue_refresh_tokens = true
///
/// [auth.scopes]
/// default_scopes = ["read"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Access and refresh token configuration.
    pub token: TokenConfig,

    /// Scope policy.
    pub scopes: ScopeConfig,
}

/// Token signing configuration.
///
/// Exactly one of `key` and `key_file` must be set. For `HS*` algorithms the
/// key bytes are the shared secret; for every other family they are PEM text.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signing algorithm.
    /// Supported: HS256/384/512, RS256/384/512, PS256/384/512, ES256/384.
    pub algorithm: String,

    /// Inline key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Path to a file holding the key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Key ID written to the `kid` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: "HS256".to_string(),
            key: None,
            key_file: None,
            key_id: None,
        }
    }
}

impl SigningConfig {
    /// Reads the configured key material.
    ///
    /// # Errors
    /// Returns an error if neither or both sources are set, or the key file
    /// cannot be read.
    pub fn key_material(&self) -> Result<Vec<u8>, ConfigError> {
        match (&self.key, &self.key_file) {
            (Some(key), None) => Ok(key.as_bytes().to_vec()),
            (None, Some(path)) => std::fs::read(path).map_err(|e| {
                ConfigError::InvalidValue(format!(
                    "cannot read signing key file '{}': {e}",
                    path.display()
                ))
            }),
            (Some(_), Some(_)) => Err(ConfigError::InvalidValue(
                "set either signing.key or signing.key_file, not both".to_string(),
            )),
            (None, None) => Err(ConfigError::Missing(
                "signing.key or signing.key_file".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("algorithm", &self.algorithm)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// Access and refresh token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Default access token lifetime, used when a grant does not ask for one.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Whether grants get a refresh token by default.
    pub issue_refresh_tokens: bool,

    /// Refresh token derivation.
    pub refresh: RefreshConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(3600), // 1 hour
            issue_refresh_tokens: true,
            refresh: RefreshConfig::default(),
        }
    }
}

/// How refresh tokens are derived from access tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStrategy {
    /// Random salt mixed with the access token; not reproducible.
    #[default]
    Salted,
    /// HMAC of the access token under `refresh.key`; reproducible.
    Keyed,
}

/// Refresh token derivation configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Derivation strategy.
    pub strategy: RefreshStrategy,

    /// Key for the keyed strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl std::fmt::Debug for RefreshConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshConfig")
            .field("strategy", &self.strategy)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Scope policy for the allow-list scope validator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Scopes every user may be granted.
    pub default_scopes: Vec<String>,

    /// Additional scopes per user ID.
    pub user_scopes: HashMap<String, Vec<String>>,

    /// Reject a request outright if any requested scope is not permitted,
    /// instead of narrowing it to the permitted subset.
    pub strict: bool,
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// Checks values that can be checked without touching key material;
    /// whether the key fits the algorithm is checked when the signer is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The signing algorithm is not supported
    /// - No signing key source, or both, are configured
    /// - The access token lifetime is zero
    /// - The keyed refresh strategy has no key
    /// - A scope entry is empty or contains whitespace or commas
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing.algorithm.parse::<SigningAlgorithm>().is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid signing algorithm: '{}'. Must be one of HS256, HS384, HS512, RS256, RS384, RS512, PS256, PS384, PS512, ES256, ES384",
                self.signing.algorithm
            )));
        }

        match (&self.signing.key, &self.signing.key_file) {
            (None, None) => {
                return Err(ConfigError::Missing(
                    "signing.key or signing.key_file".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue(
                    "set either signing.key or signing.key_file, not both".to_string(),
                ));
            }
            _ => {}
        }

        if self.token.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.token.refresh.strategy == RefreshStrategy::Keyed
            && self.token.refresh.key.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::Missing(
                "token.refresh.key (required by the keyed strategy)".to_string(),
            ));
        }

        let all_scopes = self
            .scopes
            .default_scopes
            .iter()
            .chain(self.scopes.user_scopes.values().flatten());
        for scope in all_scopes {
            if scope.is_empty() || scope.contains(|c: char| c.is_whitespace() || c == ',') {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid scope entry: '{scope}'"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.signing.key = Some("secret".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.signing.algorithm, "HS256");
        assert_eq!(config.token.access_token_lifetime, Duration::from_secs(3600));
        assert!(config.token.issue_refresh_tokens);
        assert_eq!(config.token.refresh.strategy, RefreshStrategy::Salted);
        assert!(!config.scopes.strict);
    }

    #[test]
    fn test_default_config_needs_a_key() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_algorithm_fails_validation() {
        let mut config = valid_config();
        config.signing.algorithm = "EdDSA".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("signing algorithm"));
    }

    #[test]
    fn test_valid_algorithms() {
        for alg in SigningAlgorithm::ALL {
            let mut config = valid_config();
            config.signing.algorithm = alg.as_str().to_string();
            assert!(config.validate().is_ok(), "Algorithm {alg} should be valid");
        }
    }

    #[test]
    fn test_both_key_sources_fail_validation() {
        let mut config = valid_config();
        config.signing.key_file = Some(PathBuf::from("/tmp/key.pem"));
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue(_)
        ));
        assert!(config.signing.key_material().is_err());
    }

    #[test]
    fn test_zero_lifetime_fails_validation() {
        let mut config = valid_config();
        config.token.access_token_lifetime = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keyed_refresh_requires_key() {
        let mut config = valid_config();
        config.token.refresh.strategy = RefreshStrategy::Keyed;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Missing(_)
        ));

        config.token.refresh.key = Some("refresh-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_scope_entry_fails_validation() {
        let mut config = valid_config();
        config.scopes.default_scopes = vec!["read write".to_string()];
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config
            .scopes
            .user_scopes
            .insert("u1".to_string(), vec![String::new()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_material_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"file-secret").unwrap();

        let config = SigningConfig {
            key_file: Some(file.path().to_path_buf()),
            ..SigningConfig::default()
        };
        assert_eq!(config.key_material().unwrap(), b"file-secret");
    }

    #[test]
    fn test_missing_key_file_is_reported() {
        let config = SigningConfig {
            key_file: Some(PathBuf::from("/nonexistent/tessera/key.pem")),
            ..SigningConfig::default()
        };
        let err = config.key_material().unwrap_err();
        assert!(err.to_string().contains("cannot read signing key file"));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut config = valid_config();
        config.token.refresh.key = Some("refresh-secret".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("refresh-secret"));
    }

    #[test]
    fn test_deserialize_humantime_lifetime() {
        let config: AuthConfig = serde_json::from_str(
            r#"{
                "signing": { "algorithm": "ES384", "key_file": "/etc/key.pem" },
                "token": { "access_token_lifetime": "15m", "refresh": { "strategy": "keyed", "key": "k" } },
                "scopes": { "default_scopes": ["read"], "strict": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.signing.algorithm, "ES384");
        assert_eq!(config.token.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.token.refresh.strategy, RefreshStrategy::Keyed);
        assert!(config.token.issue_refresh_tokens);
        assert!(config.scopes.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration value: test error");

        let err = ConfigError::Missing("required_field".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required configuration: required_field"
        );
    }
}
