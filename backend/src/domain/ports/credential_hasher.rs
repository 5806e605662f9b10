//! Port for hashing and verifying account passwords.

use async_trait::async_trait;

use crate::domain::CredentialHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hashing or verification could not run.
        Hashing { message: String } => "credential hashing failed: {message}",
    }
}

/// Hashes passwords for storage and checks candidates against stored hashes.
///
/// Implementations are expected to be slow on purpose; callers run them off
/// the request path's async executor where needed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plain-text password.
    async fn hash(&self, password: &str) -> Result<CredentialHash, CredentialHasherError>;

    /// Check a plain-text password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHasherError>;
}
