//! Per-call issuance context.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::AuthResult;
use crate::error::AuthError;

/// Context supplied by the caller of an issuance.
///
/// Carries the caller's deadline. The token generator enforces it around
/// collaborator calls and hands the same context to the scope validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueContext {
    deadline: Option<Instant>,
}

impl IssueContext {
    /// A context without a deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// A context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Awaits `fut`, failing with [`AuthError::DeadlineExceeded`] if the
    /// deadline passes first.
    ///
    /// # Errors
    /// Returns the future's error, or `DeadlineExceeded`.
    pub async fn run<T, F>(&self, fut: F) -> AuthResult<T>
    where
        F: Future<Output = AuthResult<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| AuthError::DeadlineExceeded)?,
            None => fut.await,
        }
    }
}
