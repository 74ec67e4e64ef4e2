//! In-memory user storage.
//!
//! Suitable for tests, the CLI, and single-process deployments seeded from
//! configuration. Nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::user::{User, UserLookup, UserStorage};

/// Users held in a map keyed by ID.
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `users`.
    ///
    /// Later entries replace earlier ones with the same ID.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStorage {
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn invite(&self, email: &str) -> AuthResult<User> {
        // Held across check and insert so concurrent invites of one address
        // create a single user.
        let mut users = self.users.write().await;
        if let Some(existing) = users.values().find(|u| u.email == email) {
            return Ok(existing.clone());
        }

        let user = User::new(email);
        users.insert(user.id.clone(), user.clone());
        tracing::debug!(user_id = %user.id, "invited user");
        Ok(user)
    }

    async fn upsert(&self, user: User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(AuthError::storage(format!(
                "email {} already belongs to another user",
                user.email
            )));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }
}
