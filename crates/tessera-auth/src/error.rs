//! Error types for token issuance.
//!
//! [`AuthError`] is what collaborators and the signer report. The token
//! generator wraps whichever error aborted a call in an [`IssuanceError`]
//! that also records the [`IssuanceStage`] that failed.

use std::fmt;

use crate::token::JwtError;

/// Errors that can occur while issuing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The user the grant was issued for does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// The identifier that could not be resolved.
        user_id: String,
    },

    /// The requested scope is invalid or not permitted for the user.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The token is malformed, has a bad signature, or carries invalid claims.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The token is well-formed and correctly signed but past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// Producing the signed token failed.
    #[error("Signing error: {0}")]
    Signing(JwtError),

    /// A collaborator did not answer before the caller's deadline.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// An error occurred while retrieving or storing user data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `UserNotFound` error.
    #[must_use]
    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller can fix this by changing the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::InvalidScope { .. }
                | Self::InvalidToken { .. }
                | Self::TokenExpired
        )
    }

    /// Returns `true` if this is a server-side failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns `true` if the token expired, so the caller can offer a refresh
    /// path instead of a hard rejection.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UserNotFound { .. } => ErrorCategory::Authentication,
            Self::InvalidScope { .. } => ErrorCategory::Authorization,
            Self::InvalidToken { .. } | Self::TokenExpired => ErrorCategory::Token,
            Self::Signing(err) if err.is_key_error() => ErrorCategory::Configuration,
            Self::Signing(_) => ErrorCategory::Internal,
            Self::DeadlineExceeded | Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidToken { .. } | Self::TokenExpired => "invalid_token",
            Self::DeadlineExceeded => "temporarily_unavailable",
            Self::Signing(_)
            | Self::Storage { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => "server_error",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            err if err.is_validation_error() => Self::invalid_token(err.to_string()),
            other => Self::Signing(other),
        }
    }
}

/// Categories of errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The grant's identity could not be resolved.
    Authentication,
    /// Permission checks (scope) failed.
    Authorization,
    /// Token validation failed.
    Token,
    /// Storage or collaborator availability errors.
    Infrastructure,
    /// Misconfiguration, including unusable key material.
    Configuration,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

// ============================================================================
// Issuance errors
// ============================================================================

/// The step of an issuance call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuanceStage {
    /// Resolving the user record.
    Lookup,
    /// Validating or narrowing the requested scope.
    ScopeValidation,
    /// Signing the access token.
    Signing,
    /// Deriving the refresh token.
    RefreshDerivation,
}

impl IssuanceStage {
    /// Returns the stage name as used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::ScopeValidation => "scope_validation",
            Self::Signing => "signing",
            Self::RefreshDerivation => "refresh_derivation",
        }
    }
}

impl fmt::Display for IssuanceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aborted issuance call. No token of any kind accompanies it.
#[derive(Debug, thiserror::Error)]
#[error("token issuance failed at {stage}: {source}")]
pub struct IssuanceError {
    /// The step that failed.
    pub stage: IssuanceStage,
    /// The underlying error, unchanged.
    #[source]
    pub source: AuthError,
}

impl IssuanceError {
    /// Creates a new issuance error for `stage`.
    #[must_use]
    pub fn new(stage: IssuanceStage, source: AuthError) -> Self {
        Self { stage, source }
    }

    /// Consumes the error, returning the underlying [`AuthError`].
    #[must_use]
    pub fn into_source(self) -> AuthError {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::user_not_found("u1");
        assert_eq!(err.to_string(), "User not found: u1");

        let err = AuthError::invalid_scope("admin not permitted");
        assert_eq!(err.to_string(), "Invalid scope: admin not permitted");

        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::user_not_found("u1").is_client_error());
        assert!(AuthError::invalid_scope("x").is_client_error());
        assert!(AuthError::TokenExpired.is_expired());
        assert!(!AuthError::invalid_token("bad").is_expired());

        assert!(AuthError::storage("down").is_server_error());
        assert!(AuthError::DeadlineExceeded.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::user_not_found("u1").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::invalid_scope("x").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(AuthError::TokenExpired.category(), ErrorCategory::Token);
        assert_eq!(
            AuthError::Signing(JwtError::unsupported_method("none")).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AuthError::Signing(JwtError::encoding_error("boom")).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::user_not_found("u1").oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            AuthError::invalid_scope("x").oauth_error_code(),
            "invalid_scope"
        );
        assert_eq!(AuthError::TokenExpired.oauth_error_code(), "invalid_token");
        assert_eq!(
            AuthError::DeadlineExceeded.oauth_error_code(),
            "temporarily_unavailable"
        );
    }

    #[test]
    fn test_from_jwt_error_keeps_expiry_distinct() {
        assert!(matches!(
            AuthError::from(JwtError::Expired),
            AuthError::TokenExpired
        ));
        assert!(matches!(
            AuthError::from(JwtError::InvalidSignature),
            AuthError::InvalidToken { .. }
        ));
        assert!(matches!(
            AuthError::from(JwtError::invalid_key("not pem")),
            AuthError::Signing(JwtError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_issuance_error_display() {
        let err = IssuanceError::new(IssuanceStage::Lookup, AuthError::user_not_found("u9"));
        assert_eq!(
            err.to_string(),
            "token issuance failed at lookup: User not found: u9"
        );
        assert!(matches!(err.into_source(), AuthError::UserNotFound { .. }));
    }
}
