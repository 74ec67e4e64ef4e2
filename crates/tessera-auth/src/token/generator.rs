//! Token generator.
//!
//! Turns an authenticated grant into a signed access token and, when asked,
//! a refresh token bound to it. Each call runs four stages in order:
//!
//! 1. resolve the user through [`UserLookup`]
//! 2. narrow a non-empty requested scope through [`ScopeValidator`]
//! 3. build and sign [`AccessClaims`]
//! 4. derive the refresh token
//!
//! The first failure aborts the call and is reported as an
//! [`IssuanceError`] naming the stage. No partial result is returned.
//!
//! The subject and the scope check use the grant's user ID, never the ID on
//! the looked-up record.
//!
//! # Usage
//!
//! ```ignore
//! let generator = TokenGenerator::new(signer, users, scopes);
//! let grant = GrantRequest::new("u1", "c1").with_scope("read");
//! let tokens = generator.generate(&IssueContext::new(), &grant, true).await?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::context::IssueContext;
use crate::error::{AuthError, IssuanceError, IssuanceStage};
use crate::scope::{AllowListScopeValidator, ScopeValidator, parse_scope};
use crate::storage::UserLookup;
use crate::token::claims::AccessClaims;
use crate::token::refresh::{RefreshTokenDeriver, SaltedRefreshDeriver, deriver_from_config};
use crate::token::signer::Signer;

/// Default access token lifetime for grants built with [`GrantRequest::new`].
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::hours(1);

/// An authenticated grant to issue tokens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    /// The user the tokens are issued for; becomes `sub`.
    pub user_id: String,

    /// The client the tokens are issued to; becomes `aud`.
    pub client_id: String,

    /// Requested scope, space or comma delimited. May be empty.
    pub scope: String,

    /// Issuance time; becomes `iat`.
    pub issued_at: OffsetDateTime,

    /// Access token lifetime; `exp` is `issued_at + lifetime`.
    pub lifetime: Duration,
}

impl GrantRequest {
    /// Creates a grant issued now, with an empty scope and the default
    /// lifetime.
    #[must_use]
    pub fn new(user_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            client_id: client_id.into(),
            scope: String::new(),
            issued_at: OffsetDateTime::now_utc(),
            lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
        }
    }

    /// Sets the requested scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the issuance time.
    #[must_use]
    pub fn issued_at(mut self, issued_at: OffsetDateTime) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}

/// The result of a successful issuance.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct IssuedTokens {
    /// The signed access token.
    pub access_token: String,

    /// The refresh token, or an empty string if none was requested.
    pub refresh_token: String,

    /// When the access token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl IssuedTokens {
    /// Returns `true` if a refresh token was issued.
    #[must_use]
    pub fn has_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl std::fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issues access and refresh tokens for authenticated grants.
///
/// Holds no per-call state; one instance serves concurrent calls.
pub struct TokenGenerator {
    signer: Arc<Signer>,
    users: Arc<dyn UserLookup>,
    scopes: Arc<dyn ScopeValidator>,
    refresh: Arc<dyn RefreshTokenDeriver>,
}

impl TokenGenerator {
    /// Creates a generator using the salted refresh token deriver.
    pub fn new(
        signer: Arc<Signer>,
        users: Arc<dyn UserLookup>,
        scopes: Arc<dyn ScopeValidator>,
    ) -> Self {
        Self {
            signer,
            users,
            scopes,
            refresh: Arc::new(SaltedRefreshDeriver),
        }
    }

    /// Creates a generator from configuration, with the allow-list scope
    /// validator and the configured refresh strategy.
    ///
    /// # Errors
    /// Returns an error if the signing key or refresh configuration is unusable.
    pub fn from_config(config: &AuthConfig, users: Arc<dyn UserLookup>) -> AuthResult<Self> {
        let signer = Signer::from_config(&config.signing)?;
        let scopes = AllowListScopeValidator::from_config(&config.scopes);
        let refresh = deriver_from_config(&config.token.refresh)?;

        Ok(Self::new(Arc::new(signer), users, Arc::new(scopes)).with_refresh_deriver(refresh.into()))
    }

    /// Replaces the refresh token deriver.
    #[must_use]
    pub fn with_refresh_deriver(mut self, refresh: Arc<dyn RefreshTokenDeriver>) -> Self {
        self.refresh = refresh;
        self
    }

    /// Returns the signer.
    #[must_use]
    pub fn signer(&self) -> &Arc<Signer> {
        &self.signer
    }

    /// Issues tokens for `grant`.
    ///
    /// The deadline carried by `ctx` bounds the user lookup and scope
    /// validation calls. `ctx` is passed to the scope validator unchanged.
    ///
    /// # Errors
    ///
    /// Returns an [`IssuanceError`] naming the stage that failed:
    /// - `Lookup`: the user does not exist, the lookup failed, or timed out
    /// - `ScopeValidation`: the scope was rejected, or validation timed out
    /// - `Signing`: the access token could not be signed
    /// - `RefreshDerivation`: the refresh token could not be derived
    #[tracing::instrument(
        name = "issue_tokens",
        skip_all,
        fields(user_id = %grant.user_id, client_id = %grant.client_id, with_refresh = with_refresh)
    )]
    pub async fn generate(
        &self,
        ctx: &IssueContext,
        grant: &GrantRequest,
        with_refresh: bool,
    ) -> Result<IssuedTokens, IssuanceError> {
        let user = ctx
            .run(self.users.find_by_id(&grant.user_id))
            .await
            .and_then(|user| user.ok_or_else(|| AuthError::user_not_found(&grant.user_id)))
            .map_err(|e| fail(IssuanceStage::Lookup, e))?;

        // A scope of separators only requests nothing.
        let scope = if parse_scope(&grant.scope).is_empty() {
            String::new()
        } else {
            ctx.run(self.scopes.validate(ctx, &grant.scope, &grant.user_id))
                .await
                .map_err(|e| fail(IssuanceStage::ScopeValidation, e))?
        };

        // Identity comes from the grant; the record only supplies profile fields.
        let claims = AccessClaims::new(
            &grant.user_id,
            &grant.client_id,
            scope,
            &user.email,
            grant.issued_at,
            grant.lifetime,
        );
        let expires_at = claims.expires_at().ok_or_else(|| {
            fail(
                IssuanceStage::Signing,
                AuthError::internal(format!("expiry {} out of range", claims.exp)),
            )
        })?;

        let access_token = self
            .signer
            .sign(&claims)
            .map_err(|e| fail(IssuanceStage::Signing, e.into()))?;

        let refresh_token = if with_refresh {
            self.refresh
                .derive(&access_token)
                .map_err(|e| fail(IssuanceStage::RefreshDerivation, e))?
        } else {
            String::new()
        };

        tracing::debug!(scope = %claims.scope, exp = claims.exp, "issued tokens");

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_at,
        })
    }
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("signer", &self.signer)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

fn fail(stage: IssuanceStage, source: AuthError) -> IssuanceError {
    tracing::debug!(stage = %stage, error = %source, "token issuance aborted");
    IssuanceError::new(stage, source)
}
