//! Port for registration persistence.
//!
//! [`RegistrationStore::try_insert`] is the only way a registration comes
//! into existence. Adapters must execute it as one atomic unit: the duplicate
//! check, the capacity check and the insert either all observe the same
//! state or the call fails without writing anything.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::domain::{EventId, Registration, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration store adapters.
    pub enum RegistrationStoreError {
        /// Repository connection could not be established or was lost.
        Connection { message: String } =>
            "registration store connection failed: {message}",
        /// The transaction lost a serialisation race or deadlocked.
        Contention { message: String } =>
            "registration store contention: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "registration store query failed: {message}",
        /// Stored rows violate referential integrity.
        Integrity { message: String } =>
            "registration store integrity violation: {message}",
    }
}

impl RegistrationStoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Contention { .. })
    }
}

/// Result of an atomic insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The registration was committed.
    Inserted(Registration),
    /// The `(user, event)` pair already exists.
    DuplicateViolation,
    /// The event holds as many registrations as its capacity allows.
    CapacityViolation,
    /// The user or the event no longer exists.
    MissingReference,
}

/// Result of removing a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Absent,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Number of registrations currently held by an event.
    ///
    /// Advisory only: the value may be stale by the time it is returned.
    async fn count_for_event(&self, event_id: EventId) -> Result<u64, RegistrationStoreError>;

    /// Registration counts for every event that has at least one.
    async fn counts_by_event(&self) -> Result<BTreeMap<EventId, u64>, RegistrationStoreError>;

    /// Atomically insert a registration when the pair is new and capacity
    /// remains. Duplicates take precedence over capacity.
    async fn try_insert(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<InsertOutcome, RegistrationStoreError>;

    /// Delete the registration for the pair, if any.
    async fn remove(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<RemoveOutcome, RegistrationStoreError>;

    /// Usernames enrolled in an event, ordered ascending.
    ///
    /// Returns [`RegistrationStoreError::Integrity`] when a registration
    /// references a user that cannot be resolved.
    async fn roster(&self, event_id: EventId) -> Result<Vec<Username>, RegistrationStoreError>;

    /// Events a user is enrolled in.
    async fn event_ids_for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<EventId>, RegistrationStoreError>;
}
