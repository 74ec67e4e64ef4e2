//! Scope validation.
//!
//! The token generator asks a [`ScopeValidator`] to narrow every non-empty
//! scope request to what the user may hold. [`AllowListScopeValidator`] is
//! the configuration-driven implementation.
//!
//! Scope strings are lists of scope tokens separated by spaces or commas.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::AuthResult;
use crate::config::ScopeConfig;
use crate::context::IssueContext;
use crate::error::AuthError;

/// Narrows or rejects a requested scope for a user.
#[async_trait]
pub trait ScopeValidator: Send + Sync {
    /// Returns the part of `requested` that `user_id` may be granted.
    ///
    /// Only called with a non-empty `requested` scope.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidScope`] if nothing (or, for strict
    /// validators, not everything) requested may be granted.
    async fn validate(
        &self,
        ctx: &IssueContext,
        requested: &str,
        user_id: &str,
    ) -> AuthResult<String>;
}

/// Splits a scope string into its tokens, dropping empties and duplicates
/// while keeping first-seen order.
#[must_use]
pub fn parse_scope(scope: &str) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    scope
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(*s))
        .collect()
}

/// Grants scopes from a static allow-list.
///
/// Every user may hold the default scopes plus any listed for their ID.
#[derive(Debug, Clone, Default)]
pub struct AllowListScopeValidator {
    default_scopes: BTreeSet<String>,
    user_scopes: HashMap<String, BTreeSet<String>>,
    strict: bool,
}

impl AllowListScopeValidator {
    /// Creates a validator that allows `default_scopes` to everyone.
    #[must_use]
    pub fn new<I, S>(default_scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_scopes: default_scopes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Creates a validator from configuration.
    #[must_use]
    pub fn from_config(config: &ScopeConfig) -> Self {
        let mut validator = Self::new(config.default_scopes.iter().cloned()).strict(config.strict);
        for (user_id, scopes) in &config.user_scopes {
            validator = validator.allow_user(user_id.clone(), scopes.iter().cloned());
        }
        validator
    }

    /// Additionally allows `scopes` to `user_id`.
    #[must_use]
    pub fn allow_user<I, S>(mut self, user_id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_scopes
            .entry(user_id.into())
            .or_default()
            .extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Sets strict mode: reject the request if any scope is not permitted.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn is_permitted(&self, user_id: &str, scope: &str) -> bool {
        self.default_scopes.contains(scope)
            || self
                .user_scopes
                .get(user_id)
                .is_some_and(|scopes| scopes.contains(scope))
    }
}

#[async_trait]
impl ScopeValidator for AllowListScopeValidator {
    async fn validate(
        &self,
        _ctx: &IssueContext,
        requested: &str,
        user_id: &str,
    ) -> AuthResult<String> {
        let requested = parse_scope(requested);
        if requested.is_empty() {
            return Err(AuthError::invalid_scope("no scope requested"));
        }

        let (granted, denied): (Vec<&str>, Vec<&str>) = requested
            .into_iter()
            .partition(|scope| self.is_permitted(user_id, scope));

        if granted.is_empty() || (self.strict && !denied.is_empty()) {
            return Err(AuthError::invalid_scope(format!(
                "scope {} not permitted for user {user_id}",
                denied.join(" ")
            )));
        }

        if !denied.is_empty() {
            tracing::debug!(user_id, denied = %denied.join(" "), "narrowed requested scope");
        }

        Ok(granted.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn validator() -> AllowListScopeValidator {
        AllowListScopeValidator::new(["read", "profile"]).allow_user("u1", ["write"])
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope("read write"), vec!["read", "write"]);
        assert_eq!(parse_scope("read,write"), vec!["read", "write"]);
        assert_eq!(parse_scope(" read ,, write  read "), vec!["read", "write"]);
        assert!(parse_scope("").is_empty());
        assert!(parse_scope(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_permitted_scope_passes() {
        let ctx = IssueContext::new();
        let granted = validator().validate(&ctx, "read write", "u1").await.unwrap();
        assert_eq!(granted, "read write");
    }

    #[tokio::test]
    async fn test_scope_is_narrowed() {
        let ctx = IssueContext::new();
        let granted = validator()
            .validate(&ctx, "read,write,admin", "u2")
            .await
            .unwrap();
        assert_eq!(granted, "read");
    }

    #[tokio::test]
    async fn test_nothing_permitted_is_rejected() {
        let ctx = IssueContext::new();
        let err = validator().validate(&ctx, "admin", "u1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
        assert!(err.to_string().contains("admin"));
    }

    #[tokio::test]
    async fn test_separator_only_scope_names_no_scope() {
        let ctx = IssueContext::new();
        let err = validator().validate(&ctx, "  ", "u1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidScope { .. }));
        assert_eq!(err.to_string(), "Invalid scope: no scope requested");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_partial() {
        let ctx = IssueContext::new();
        let strict = validator().strict(true);
        assert!(strict.validate(&ctx, "read admin", "u1").await.is_err());
        assert_eq!(
            strict.validate(&ctx, "read write", "u1").await.unwrap(),
            "read write"
        );
    }

    #[test]
    fn test_from_config() {
        let config = ScopeConfig {
            default_scopes: vec!["read".to_string()],
            user_scopes: HashMap::from([("admin-user".to_string(), vec!["admin".to_string()])]),
            strict: false,
        };
        let validator = AllowListScopeValidator::from_config(&config);
        let ctx = IssueContext::new();

        let granted = block_on(validator.validate(&ctx, "admin", "admin-user")).unwrap();
        assert_eq!(granted, "admin");
        assert!(block_on(validator.validate(&ctx, "admin", "u1")).is_err());
    }
}
