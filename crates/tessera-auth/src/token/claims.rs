//! Access token claims and their validity predicate.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::Clock;
use crate::token::JwtError;

/// User profile fields embedded in the access token.
///
/// A snapshot taken at issuance time, not a live reference to the user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimsUser {
    /// The user's email address.
    pub email: String,
}

/// Claims carried by an issued access token.
///
/// Serialized as
/// `{"sub", "aud", "exp", "iat", "scope", "user": {"email"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: String,

    /// Audience (client ID).
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Granted scope, space or comma delimited. May be empty.
    #[serde(default)]
    pub scope: String,

    /// Embedded user profile.
    pub user: ClaimsUser,
}

impl AccessClaims {
    /// Builds claims for `subject` issued to `audience` at `issued_at`,
    /// expiring `lifetime` later.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        audience: impl Into<String>,
        scope: impl Into<String>,
        email: impl Into<String>,
        issued_at: OffsetDateTime,
        lifetime: time::Duration,
    ) -> Self {
        let iat = issued_at.unix_timestamp();
        Self {
            sub: subject.into(),
            aud: audience.into(),
            exp: iat.saturating_add(lifetime.whole_seconds()),
            iat,
            scope: scope.into(),
            user: ClaimsUser {
                email: email.into(),
            },
        }
    }

    /// Returns the expiry as a timestamp.
    ///
    /// Returns `None` if `exp` is outside the representable range.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp).ok()
    }

    /// Returns `true` if these claims are valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        check_expiry(self, now).is_ok()
    }
}

/// Checks that `claims` have not expired at `now`.
///
/// Valid only if `exp` is strictly after `now` (seconds resolution); a token
/// whose expiry equals the current second is already expired.
///
/// # Errors
/// Returns [`JwtError::Expired`] otherwise.
pub fn check_expiry(claims: &AccessClaims, now: OffsetDateTime) -> Result<(), JwtError> {
    if claims.exp > now.unix_timestamp() {
        Ok(())
    } else {
        Err(JwtError::Expired)
    }
}

/// Checks `claims` against a fresh reading of `clock`.
///
/// # Errors
/// Returns [`JwtError::Expired`] if the claims have expired.
pub fn validate(claims: &AccessClaims, clock: &dyn Clock) -> Result<(), JwtError> {
    check_expiry(claims, clock.now())
}
