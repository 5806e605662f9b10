//! In-process store implementing the user, event and registration ports.
//!
//! Used when no database is configured and by integration tests. Every
//! operation runs inside one critical section over the whole state, which
//! gives `try_insert` the same atomicity the PostgreSQL adapter gets from its
//! row lock. State is lost on restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    EventRepository, EventRepositoryError, InsertOutcome, RegistrationStore,
    RegistrationStoreError, RemoveOutcome, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Event, EventId, NewEvent, NewUser, Registration, RegistrationId, StoredUser, User, UserId,
    Username,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, StoredUser>,
    events: BTreeMap<EventId, Event>,
    registrations: BTreeMap<RegistrationId, Registration>,
    next_id: i64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn registrations_for(&self, event_id: EventId) -> impl Iterator<Item = &Registration> {
        self.registrations
            .values()
            .filter(move |registration| registration.event_id == event_id)
    }
}

/// Shared in-memory store. Clones share the same state.
///
/// # Examples
/// ```
/// use eventhub::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let shared = store.clone();
/// # let _ = shared;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, MemoryState>> {
        self.state.lock().ok()
    }

    /// Delete a user and, like the database cascade, their registrations.
    ///
    /// Returns `false` when the user did not exist or the lock is poisoned.
    pub fn delete_user(&self, user_id: UserId) -> bool {
        let Some(mut state) = self.lock() else {
            return false;
        };
        let existed = state.users.remove(&user_id).is_some();
        state
            .registrations
            .retain(|_, registration| registration.user_id != user_id);
        existed
    }

    /// Delete an event and its registrations.
    pub fn delete_event(&self, event_id: EventId) -> bool {
        let Some(mut state) = self.lock() else {
            return false;
        };
        let existed = state.events.remove(&event_id).is_some();
        state
            .registrations
            .retain(|_, registration| registration.event_id != event_id);
        existed
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if state
            .users
            .values()
            .any(|stored| stored.user.username() == &user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }
        let id = UserId::new(state.allocate_id());
        let created = User::new(id, user.username.clone(), user.is_admin);
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                credential_hash: user.credential_hash.clone(),
            },
        );
        Ok(created)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| EventRepositoryError::query(POISONED))?;
        Ok(state.events.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| EventRepositoryError::query(POISONED))?;
        Ok(state.events.values().cloned().collect())
    }

    async fn insert_if_absent(
        &self,
        event: &NewEvent,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| EventRepositoryError::query(POISONED))?;
        if state.events.values().any(|existing| existing.name == event.name) {
            return Ok(None);
        }
        let id = EventId::new(state.allocate_id());
        let created = Event {
            id,
            name: event.name.clone(),
            capacity: event.capacity,
        };
        state.events.insert(id, created.clone());
        Ok(Some(created))
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn count_for_event(&self, event_id: EventId) -> Result<u64, RegistrationStoreError> {
        let state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;
        Ok(state.registrations_for(event_id).count() as u64)
    }

    async fn counts_by_event(&self) -> Result<BTreeMap<EventId, u64>, RegistrationStoreError> {
        let state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;
        let mut counts = BTreeMap::new();
        for registration in state.registrations.values() {
            *counts.entry(registration.event_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn try_insert(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<InsertOutcome, RegistrationStoreError> {
        let mut state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;

        let Some(capacity) = state.events.get(&event_id).map(|event| event.capacity) else {
            return Ok(InsertOutcome::MissingReference);
        };
        if !state.users.contains_key(&user_id) {
            return Ok(InsertOutcome::MissingReference);
        }
        if state
            .registrations_for(event_id)
            .any(|registration| registration.user_id == user_id)
        {
            return Ok(InsertOutcome::DuplicateViolation);
        }
        let taken = state.registrations_for(event_id).count() as u64;
        if capacity.is_saturated_by(taken) {
            return Ok(InsertOutcome::CapacityViolation);
        }

        let registration = Registration {
            id: RegistrationId::new(state.allocate_id()),
            user_id,
            event_id,
        };
        state.registrations.insert(registration.id, registration);
        Ok(InsertOutcome::Inserted(registration))
    }

    async fn remove(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<RemoveOutcome, RegistrationStoreError> {
        let mut state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;
        let before = state.registrations.len();
        state.registrations.retain(|_, registration| {
            !(registration.user_id == user_id && registration.event_id == event_id)
        });
        Ok(if state.registrations.len() < before {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::Absent
        })
    }

    async fn roster(&self, event_id: EventId) -> Result<Vec<Username>, RegistrationStoreError> {
        let state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;
        let mut usernames = state
            .registrations_for(event_id)
            .map(|registration| {
                state
                    .users
                    .get(&registration.user_id)
                    .map(|stored| stored.user.username().clone())
                    .ok_or_else(|| {
                        RegistrationStoreError::integrity(format!(
                            "registration {} references missing user {}",
                            registration.id, registration.user_id
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        usernames.sort();
        Ok(usernames)
    }

    async fn event_ids_for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<EventId>, RegistrationStoreError> {
        let state = self
            .lock()
            .ok_or_else(|| RegistrationStoreError::query(POISONED))?;
        Ok(state
            .registrations
            .values()
            .filter(|registration| registration.user_id == user_id)
            .map(|registration| registration.event_id)
            .collect())
    }
}
