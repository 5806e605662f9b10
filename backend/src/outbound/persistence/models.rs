//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! stored values so a corrupt row surfaces as an error rather than a panic.

use diesel::prelude::*;

use crate::domain::{
    Capacity, CredentialHash, Event, EventId, EventName, Registration, RegistrationId,
    StoredUser, User, UserId, Username,
};

use super::schema::{events, registrations, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub credential_hash: String,
    pub is_admin: bool,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        Ok(self.into_stored()?.user)
    }

    pub(crate) fn into_stored(self) -> Result<StoredUser, String> {
        let username = Username::new(self.username)
            .map_err(|err| format!("user {} has an invalid username: {err}", self.id))?;
        Ok(StoredUser {
            user: User::new(UserId::new(self.id), username, self.is_admin),
            credential_hash: CredentialHash::new(self.credential_hash),
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub credential_hash: &'a str,
    pub is_admin: bool,
}

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
}

impl TryFrom<EventRow> for Event {
    type Error = String;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let name = EventName::new(row.name)
            .map_err(|err| format!("event {} has an invalid name: {err}", row.id))?;
        let capacity = u32::try_from(row.capacity)
            .map_err(|_| format!("event {} has a negative capacity", row.id))
            .and_then(|raw| {
                Capacity::new(raw).map_err(|err| format!("event {}: {err}", row.id))
            })?;
        Ok(Event {
            id: EventId::new(row.id),
            name,
            capacity,
        })
    }
}

/// Insertable struct for creating new event records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub name: &'a str,
    pub capacity: i32,
}

/// Row struct for reading from the registrations table.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: RegistrationId::new(row.id),
            user_id: UserId::new(row.user_id),
            event_id: EventId::new(row.event_id),
        }
    }
}

/// Insertable struct for creating new registration records.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow {
    pub user_id: i64,
    pub event_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn event_row_with_zero_capacity_is_rejected() {
        let row = EventRow {
            id: 4,
            name: "Seminar 2025".to_owned(),
            capacity: 0,
        };
        let err = Event::try_from(row).expect_err("zero capacity");
        assert!(err.contains("event 4"));
    }

    #[rstest]
    fn event_row_with_negative_capacity_is_rejected() {
        let row = EventRow {
            id: 5,
            name: "Seminar 2025".to_owned(),
            capacity: -3,
        };
        assert!(Event::try_from(row).is_err());
    }

    #[rstest]
    fn user_row_converts_to_stored_user() {
        let row = UserRow {
            id: 9,
            username: "admin".to_owned(),
            credential_hash: "$2b$04$hash".to_owned(),
            is_admin: true,
        };
        let stored = row.into_stored().expect("valid row");
        assert!(stored.user.is_admin());
        assert_eq!(stored.credential_hash.as_str(), "$2b$04$hash");
    }
}
