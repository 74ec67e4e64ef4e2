//! User records and the lookup interface the token generator depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// Default datetime value for deserialization when field is missing.
fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

// =============================================================================
// User Type
// =============================================================================

/// A user tokens can be issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier; becomes the token subject.
    pub id: String,

    /// Email address; embedded in access tokens as `user.email`.
    pub email: String,

    /// When the user was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with a random UUID as the ID.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), email)
    }

    /// Creates a new user with a known ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

// =============================================================================
// Storage Traits
// =============================================================================

/// Resolves user IDs to user records.
///
/// `Ok(None)` means the user does not exist; `Err` means the backend failed.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;
}

/// User persistence beyond lookup.
#[async_trait]
pub trait UserStorage: UserLookup {
    /// Find a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Returns the user with `email`, creating one with a fresh ID if none
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn invite(&self, email: &str) -> AuthResult<User>;

    /// Insert or replace a user.
    ///
    /// # Errors
    ///
    /// Returns an error if another user already owns the email address,
    /// or the storage operation fails.
    async fn upsert(&self, user: User) -> AuthResult<()>;
}
