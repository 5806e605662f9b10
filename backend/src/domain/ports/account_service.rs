//! Driving port for account use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! create accounts and authenticate credentials without knowing the backing
//! infrastructure, so handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignupCredentials, User, UserId};

/// Domain use-case port for sign-up, login and identity lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create a new non-admin account.
    async fn signup(&self, credentials: &SignupCredentials) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Resolve a session identity to the current user record.
    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;
}
