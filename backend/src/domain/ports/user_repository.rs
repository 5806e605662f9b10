//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, StoredUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } => "username already exists: {username}",
    }
}

impl UserPersistenceError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and their credential hash by username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Insert a new account.
    ///
    /// Returns [`UserPersistenceError::DuplicateUsername`] when the unique
    /// username constraint rejects the row.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;
}
