//! Idempotent seeding of default events and the administrator account.

use std::fmt;

use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, EventRepository, EventRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{NewEvent, NewUser, Username};

/// Errors returned while bootstrapping.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to seed events: {0}")]
    Events(#[from] EventRepositoryError),
    #[error("failed to seed administrator: {0}")]
    Users(#[from] UserPersistenceError),
    #[error("failed to hash administrator password: {0}")]
    Hashing(#[from] CredentialHasherError),
}

/// Administrator account to create when absent.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: Username,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What to seed at start-up.
#[derive(Debug, Clone, Default)]
pub struct BootstrapPlan {
    pub events: Vec<NewEvent>,
    pub admin: Option<AdminSeed>,
}

/// Summary of a bootstrap run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub events_created: usize,
    pub events_existing: usize,
    pub admin_created: bool,
}

/// Apply `plan`, creating only what does not exist yet.
///
/// Safe to run concurrently from several processes: events rely on
/// [`EventRepository::insert_if_absent`] and a racing admin insert is
/// recognised through the duplicate-username error.
pub async fn bootstrap<U, E, H>(
    plan: &BootstrapPlan,
    users: &U,
    events: &E,
    hasher: &H,
) -> Result<BootstrapReport, BootstrapError>
where
    U: UserRepository + ?Sized,
    E: EventRepository + ?Sized,
    H: CredentialHasher + ?Sized,
{
    let mut report = BootstrapReport::default();

    for event in &plan.events {
        match events.insert_if_absent(event).await? {
            Some(created) => {
                info!(event_id = %created.id, name = %created.name, "seeded event");
                report.events_created += 1;
            }
            None => report.events_existing += 1,
        }
    }

    if let Some(admin) = &plan.admin {
        report.admin_created = seed_admin(admin, users, hasher).await?;
    }

    info!(
        events_created = report.events_created,
        events_existing = report.events_existing,
        admin_created = report.admin_created,
        "bootstrap complete"
    );
    Ok(report)
}

async fn seed_admin<U, H>(admin: &AdminSeed, users: &U, hasher: &H) -> Result<bool, BootstrapError>
where
    U: UserRepository + ?Sized,
    H: CredentialHasher + ?Sized,
{
    if users
        .find_by_username(admin.username.as_ref())
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let credential_hash = hasher.hash(admin.password.as_str()).await?;
    let new_user = NewUser {
        username: admin.username.clone(),
        credential_hash,
        is_admin: true,
    };
    match users.insert(&new_user).await {
        Ok(user) => {
            info!(user_id = %user.id(), username = %admin.username, "seeded administrator");
            Ok(true)
        }
        Err(UserPersistenceError::DuplicateUsername { .. }) => Ok(false),
        Err(err) => Err(err.into()),
    }
}
