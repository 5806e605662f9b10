//! Account service: sign-up, login and identity lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountService, CredentialHasher, CredentialHasherError, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, NewUser, SignupCredentials, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Password-based [`AccountService`] backed by a user repository.
#[derive(Clone)]
pub struct PasswordAccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> PasswordAccountService<U, H> {
    /// Create a service with the given repository and hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict("username already exists")
                .with_details(json!({ "field": "username", "value": username }))
        }
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<U, H> AccountService for PasswordAccountService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn signup(&self, credentials: &SignupCredentials) -> Result<User, Error> {
        let credential_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        let user = self
            .users
            .insert(&NewUser {
                username: credentials.username().clone(),
                credential_hash,
                is_admin: false,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "account created");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            debug!("login rejected: unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.credential_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            debug!(user_id = %stored.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }
}
