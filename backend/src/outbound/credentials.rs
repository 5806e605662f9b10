//! bcrypt-backed [`CredentialHasher`].

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::CredentialHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Hashes passwords with bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptCredentialHasher {
    cost: u32,
}

impl Default for BcryptCredentialHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptCredentialHasher {
    /// Create a hasher with an explicit work factor, clamped to bcrypt's
    /// accepted range.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

fn hashing_error(err: impl std::fmt::Display) -> CredentialHasherError {
    CredentialHasherError::hashing(err.to_string())
}

#[async_trait]
impl CredentialHasher for BcryptCredentialHasher {
    async fn hash(&self, password: &str) -> Result<CredentialHash, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;
        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(password.as_str(), cost))
            .await
            .map_err(hashing_error)?
            .map_err(hashing_error)?;
        Ok(CredentialHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password.as_str(), &encoded))
            .await
            .map_err(hashing_error)?
            .map_err(hashing_error)
    }
}
