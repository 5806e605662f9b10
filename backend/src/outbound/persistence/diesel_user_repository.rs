//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, StoredUser, User, UserId};

use super::diesel_error_mapping::{DieselFault, classify, pool_fault};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_fault(fault: DieselFault, username: Option<&str>) -> UserPersistenceError {
    match fault {
        DieselFault::Connection(message) | DieselFault::Contention(message) => {
            UserPersistenceError::connection(message)
        }
        DieselFault::UniqueViolation { .. } => {
            UserPersistenceError::duplicate_username(username.unwrap_or_default())
        }
        DieselFault::ForeignKeyViolation => {
            UserPersistenceError::query("unexpected foreign key violation")
        }
        DieselFault::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &'static str) -> UserPersistenceError {
    map_fault(classify(error, operation), None)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err), None))?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "users.find_by_id"))?;

        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err), None))?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "users.find_by_username"))?;

        row.map(UserRow::into_stored)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let username = user.username.as_ref();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err), Some(username)))?;

        let row = NewUserRow {
            username,
            credential_hash: user.credential_hash.as_str(),
            is_admin: user.is_admin,
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "users.insert"), Some(username)))?;

        inserted.into_user().map_err(UserPersistenceError::query)
    }
}
