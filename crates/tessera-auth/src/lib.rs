//! # tessera-auth
//!
//! Access-token issuance core for an OAuth2-style authorization server.
//!
//! This crate provides:
//! - Signed access tokens over the HMAC, RSA, RSA-PSS and elliptic-curve
//!   algorithm families
//! - Claims with an expiry predicate over an injectable clock
//! - Opaque refresh tokens derived from the issued access token
//! - A token generator that resolves the user, narrows the scope, signs and
//!   derives, failing as a whole at the first failing stage
//!
//! ## Modules
//!
//! - [`token`] - Claims, signer, refresh derivation and the token generator
//! - [`scope`] - Scope validation
//! - [`storage`] - User lookup and an in-memory user store
//! - [`config`] - Signing, token and scope configuration
//! - [`context`] - Per-call issuance context
//! - [`clock`] - Time sources
//! - [`error`] - Error types

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod scope;
pub mod storage;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AuthConfig, ConfigError};
pub use context::IssueContext;
pub use error::{AuthError, ErrorCategory, IssuanceError, IssuanceStage};
pub use scope::{AllowListScopeValidator, ScopeValidator};
pub use storage::{InMemoryUserStorage, User, UserLookup, UserStorage};
pub use token::{
    AccessClaims, GrantRequest, IssuedTokens, JwtError, Signer, SigningAlgorithm, TokenGenerator,
};

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::context::IssueContext;
    pub use crate::error::{AuthError, ErrorCategory, IssuanceError, IssuanceStage};
    pub use crate::scope::{AllowListScopeValidator, ScopeValidator};
    pub use crate::storage::{InMemoryUserStorage, User, UserLookup, UserStorage};
    pub use crate::token::{
        AccessClaims, GrantRequest, IssuedTokens, JwtError, RefreshTokenDeriver, Signer,
        SigningAlgorithm, SigningKey, TokenGenerator,
    };
}
