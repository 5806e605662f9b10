//! Roster and catalogue read models.
//!
//! `RosterService` implements the [`RosterQuery`] driving port on top of the
//! event and registration stores.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::ports::{
    EventRepository, EventRepositoryError, RegistrationStore, RegistrationStoreError,
    RosterQuery, UserPersistenceError, UserRepository,
};
use crate::domain::{Capacity, Error, Event, EventId, EventName, UserId, Username};

/// An event together with the usernames enrolled in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub event: Event,
    #[schema(value_type = Vec<String>)]
    pub usernames: Vec<Username>,
}

/// Catalogue entry with advisory seat usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[schema(value_type = i64)]
    pub id: EventId,
    pub name: EventName,
    pub capacity: Capacity,
    pub registered: u64,
    pub remaining: u64,
}

impl EventSummary {
    /// Combine an event with its registration count.
    #[must_use]
    pub fn new(event: Event, registered: u64) -> Self {
        Self {
            id: event.id,
            remaining: event.capacity.remaining_after(registered),
            name: event.name,
            capacity: event.capacity,
            registered,
        }
    }
}

/// Read-side service over events and registrations.
#[derive(Clone)]
pub struct RosterService<U, E, R> {
    users: Arc<U>,
    events: Arc<E>,
    registrations: Arc<R>,
}

impl<U, E, R> RosterService<U, E, R> {
    /// Create a service over the given stores.
    pub fn new(users: Arc<U>, events: Arc<E>, registrations: Arc<R>) -> Self {
        Self {
            users,
            events,
            registrations,
        }
    }
}

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event repository unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn map_registration_error(error: RegistrationStoreError) -> Error {
    match error {
        RegistrationStoreError::Connection { message }
        | RegistrationStoreError::Contention { message } => {
            Error::service_unavailable(format!("registration store unavailable: {message}"))
        }
        RegistrationStoreError::Query { message } => {
            Error::internal(format!("registration store error: {message}"))
        }
        RegistrationStoreError::Integrity { message } => {
            error!(error = %message, "registration integrity violation on read");
            Error::internal(format!("registration data is inconsistent: {message}"))
        }
    }
}

impl<U, E, R> RosterService<U, E, R>
where
    U: UserRepository,
    E: EventRepository,
    R: RegistrationStore,
{
    async fn roster_for(&self, event: Event) -> Result<Roster, Error> {
        let usernames = self
            .registrations
            .roster(event.id)
            .await
            .map_err(map_registration_error)?;
        Ok(Roster { event, usernames })
    }
}

#[async_trait]
impl<U, E, R> RosterQuery for RosterService<U, E, R>
where
    U: UserRepository,
    E: EventRepository,
    R: RegistrationStore,
{
    async fn list_roster(&self, event_id: EventId) -> Result<Roster, Error> {
        let event = self
            .events
            .find_by_id(event_id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found(format!("event {event_id} not found")))?;
        self.roster_for(event).await
    }

    async fn list_user_enrollments(&self, user_id: UserId) -> Result<BTreeSet<EventId>, Error> {
        if self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .is_none()
        {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        self.registrations
            .event_ids_for_user(user_id)
            .await
            .map_err(map_registration_error)
    }

    async fn list_events(&self) -> Result<Vec<EventSummary>, Error> {
        let events = self.events.list().await.map_err(map_event_error)?;
        let counts = self
            .registrations
            .counts_by_event()
            .await
            .map_err(map_registration_error)?;
        Ok(events
            .into_iter()
            .map(|event| {
                let registered = counts.get(&event.id).copied().unwrap_or(0);
                EventSummary::new(event, registered)
            })
            .collect())
    }

    async fn list_all_rosters(&self) -> Result<Vec<Roster>, Error> {
        let events = self.events.list().await.map_err(map_event_error)?;
        let mut rosters = Vec::with_capacity(events.len());
        for event in events {
            rosters.push(self.roster_for(event).await?);
        }
        Ok(rosters)
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for roster reads using mocked stores.
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockEventRepository, MockRegistrationStore, MockUserRepository};
    use crate::domain::User;
    use rstest::rstest;

    fn event(id: i64, name: &str, capacity: u32) -> Event {
        Event {
            id: EventId::new(id),
            name: EventName::new(name).expect("valid name"),
            capacity: Capacity::new(capacity).expect("positive"),
        }
    }

    fn names(raw: &[&str]) -> Vec<Username> {
        raw.iter()
            .map(|name| Username::new(*name).expect("valid username"))
            .collect()
    }

    fn service(
        users: MockUserRepository,
        events: MockEventRepository,
        store: MockRegistrationStore,
    ) -> RosterService<MockUserRepository, MockEventRepository, MockRegistrationStore> {
        RosterService::new(Arc::new(users), Arc::new(events), Arc::new(store))
    }

    #[rstest]
    #[tokio::test]
    async fn list_roster_returns_store_order() {
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(|_| Ok(Some(event(1, "Hackathon 2025", 2))));
        let mut store = MockRegistrationStore::new();
        store
            .expect_roster()
            .returning(|_| Ok(names(&["alice", "bob"])));

        let svc = service(MockUserRepository::new(), events, store);
        let first = svc.list_roster(EventId::new(1)).await.expect("roster");
        let second = svc.list_roster(EventId::new(1)).await.expect("roster");
        assert_eq!(first.usernames, names(&["alice", "bob"]));
        assert_eq!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn list_roster_unknown_event_is_not_found() {
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().return_once(|_| Ok(None));
        let mut store = MockRegistrationStore::new();
        store.expect_roster().times(0);

        let svc = service(MockUserRepository::new(), events, store);
        let err = svc.list_roster(EventId::new(9)).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn orphaned_rows_surface_as_internal_error() {
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(|_| Ok(Some(event(1, "Seminar 2025", 5))));
        let mut store = MockRegistrationStore::new();
        store
            .expect_roster()
            .return_once(|_| Err(RegistrationStoreError::integrity("user 4 missing")));

        let svc = service(MockUserRepository::new(), events, store);
        let err = svc.list_roster(EventId::new(1)).await.expect_err("corrupt");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn list_user_enrollments_requires_known_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let svc = service(users, MockEventRepository::new(), MockRegistrationStore::new());
        let err = svc
            .list_user_enrollments(UserId::new(4))
            .await
            .expect_err("missing user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn list_user_enrollments_returns_event_ids() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|id| {
            Ok(Some(User::new(
                id,
                Username::new("ada").expect("valid username"),
                false,
            )))
        });
        let mut store = MockRegistrationStore::new();
        store
            .expect_event_ids_for_user()
            .return_once(|_| Ok(BTreeSet::from([EventId::new(1), EventId::new(3)])));

        let svc = service(users, MockEventRepository::new(), store);
        let ids = svc
            .list_user_enrollments(UserId::new(4))
            .await
            .expect("enrollments");
        assert_eq!(ids, BTreeSet::from([EventId::new(1), EventId::new(3)]));
    }

    #[rstest]
    #[tokio::test]
    async fn list_events_reports_remaining_seats() {
        let mut events = MockEventRepository::new();
        events.expect_list().return_once(|| {
            Ok(vec![
                event(1, "Hackathon 2025", 2),
                event(2, "Workshop 2025", 3),
            ])
        });
        let mut store = MockRegistrationStore::new();
        store
            .expect_counts_by_event()
            .return_once(|| Ok(BTreeMap::from([(EventId::new(1), 2)])));

        let svc = service(MockUserRepository::new(), events, store);
        let summaries = svc.list_events().await.expect("summaries");
        let seats: Vec<_> = summaries
            .iter()
            .map(|summary| (summary.id.get(), summary.registered, summary.remaining))
            .collect();
        assert_eq!(seats, vec![(1, 2, 0), (2, 0, 3)]);
    }

    #[rstest]
    #[tokio::test]
    async fn list_all_rosters_covers_every_event() {
        let mut events = MockEventRepository::new();
        events.expect_list().return_once(|| {
            Ok(vec![
                event(1, "Hackathon 2025", 2),
                event(2, "Workshop 2025", 3),
            ])
        });
        let mut store = MockRegistrationStore::new();
        store.expect_roster().returning(|event_id| {
            if event_id == EventId::new(1) {
                Ok(names(&["ada"]))
            } else {
                Ok(Vec::new())
            }
        });

        let svc = service(MockUserRepository::new(), events, store);
        let rosters = svc.list_all_rosters().await.expect("rosters");
        assert_eq!(rosters.len(), 2);
        assert_eq!(rosters[0].usernames, names(&["ada"]));
        assert!(rosters[1].usernames.is_empty());
    }
}
