//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`RegistrationStore`], [`CredentialHasher`])
//! are implemented by outbound adapters. Driving ports
//! ([`EnrollmentCommand`], [`RosterQuery`], [`AccountService`]) are called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod credential_hasher;
mod enrollment_command;
mod event_repository;
mod registration_store;
mod roster_query;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use enrollment_command::EnrollmentCommand;
#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use event_repository::MockEventRepository;
#[cfg(test)]
pub use registration_store::MockRegistrationStore;
pub use registration_store::{
    InsertOutcome, RegistrationStore, RegistrationStoreError, RemoveOutcome,
};
#[cfg(test)]
pub use roster_query::MockRosterQuery;
pub use roster_query::RosterQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
