//! Driving port for enrollment read models.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Error, EventId, EventSummary, Roster, UserId};

/// Read-only queries over events and registrations.
///
/// Results are ordered deterministically so repeated reads without
/// intervening writes are identical.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterQuery: Send + Sync {
    /// The event and the usernames enrolled in it.
    async fn list_roster(&self, event_id: EventId) -> Result<Roster, Error>;

    /// Identifiers of the events a user is enrolled in.
    async fn list_user_enrollments(&self, user_id: UserId) -> Result<BTreeSet<EventId>, Error>;

    /// Every event with its current seat usage.
    async fn list_events(&self) -> Result<Vec<EventSummary>, Error>;

    /// Rosters for every event, ordered by event identifier.
    async fn list_all_rosters(&self) -> Result<Vec<Roster>, Error>;
}
