//! PostgreSQL-backed `RegistrationStore` implementation using Diesel ORM.
//!
//! `try_insert` runs in one transaction that first locks the event row with
//! `SELECT ... FOR UPDATE`. Every enrollment for the same event therefore
//! queues behind that lock, across all server processes, so the count it
//! reads cannot go stale before the insert commits. The
//! `registrations_user_event_key` constraint stays authoritative for
//! duplicates.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    InsertOutcome, RegistrationStore, RegistrationStoreError, RemoveOutcome,
};
use crate::domain::{EventId, UserId, Username};

use super::diesel_error_mapping::{DieselFault, classify, pool_fault};
use super::models::{NewRegistrationRow, RegistrationRow};
use super::pool::DbPool;
use super::schema::{events, registrations, users};

/// Diesel-backed implementation of the [`RegistrationStore`] port.
#[derive(Clone)]
pub struct DieselRegistrationStore {
    pool: DbPool,
}

impl DieselRegistrationStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_fault(fault: DieselFault) -> RegistrationStoreError {
    match fault {
        DieselFault::Connection(message) => RegistrationStoreError::connection(message),
        DieselFault::Contention(message) => RegistrationStoreError::contention(message),
        DieselFault::UniqueViolation { constraint } => RegistrationStoreError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("<unknown>")
        )),
        DieselFault::ForeignKeyViolation => {
            RegistrationStoreError::query("unexpected foreign key violation")
        }
        DieselFault::Query(message) => RegistrationStoreError::query(message),
    }
}

/// Turn a failed insert transaction into an outcome where the database
/// constraints already answered the question.
fn map_insert_fault(fault: DieselFault) -> Result<InsertOutcome, RegistrationStoreError> {
    match fault {
        DieselFault::UniqueViolation { .. } => Ok(InsertOutcome::DuplicateViolation),
        DieselFault::ForeignKeyViolation => Ok(InsertOutcome::MissingReference),
        other => Err(map_fault(other)),
    }
}

fn to_count(raw: i64) -> Result<u64, RegistrationStoreError> {
    u64::try_from(raw).map_err(|_| RegistrationStoreError::query("negative registration count"))
}

#[async_trait]
impl RegistrationStore for DieselRegistrationStore {
    async fn count_for_event(&self, event_id: EventId) -> Result<u64, RegistrationStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let count: i64 = registrations::table
            .filter(registrations::event_id.eq(event_id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "registrations.count_for_event")))?;
        to_count(count)
    }

    async fn counts_by_event(&self) -> Result<BTreeMap<EventId, u64>, RegistrationStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let rows: Vec<(i64, i64)> = registrations::table
            .group_by(registrations::event_id)
            .select((registrations::event_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "registrations.counts_by_event")))?;

        rows.into_iter()
            .map(|(event_id, count)| Ok((EventId::new(event_id), to_count(count)?)))
            .collect()
    }

    async fn try_insert(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<InsertOutcome, RegistrationStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let result: Result<InsertOutcome, diesel::result::Error> = conn
            .transaction(|conn| {
                async move {
                    let capacity: Option<i32> = events::table
                        .find(event_id.get())
                        .select(events::capacity)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(capacity) = capacity else {
                        return Ok(InsertOutcome::MissingReference);
                    };

                    let user_exists: bool =
                        diesel::select(diesel::dsl::exists(users::table.find(user_id.get())))
                            .get_result(conn)
                            .await?;
                    if !user_exists {
                        return Ok(InsertOutcome::MissingReference);
                    }

                    let already_enrolled: bool = diesel::select(diesel::dsl::exists(
                        registrations::table
                            .filter(registrations::user_id.eq(user_id.get()))
                            .filter(registrations::event_id.eq(event_id.get())),
                    ))
                    .get_result(conn)
                    .await?;
                    if already_enrolled {
                        return Ok(InsertOutcome::DuplicateViolation);
                    }

                    let taken: i64 = registrations::table
                        .filter(registrations::event_id.eq(event_id.get()))
                        .count()
                        .get_result(conn)
                        .await?;
                    if taken >= i64::from(capacity) {
                        debug!(%event_id, taken, capacity, "event at capacity");
                        return Ok(InsertOutcome::CapacityViolation);
                    }

                    let inserted: Option<RegistrationRow> =
                        diesel::insert_into(registrations::table)
                            .values(&NewRegistrationRow {
                                user_id: user_id.get(),
                                event_id: event_id.get(),
                            })
                            .on_conflict((registrations::user_id, registrations::event_id))
                            .do_nothing()
                            .returning(RegistrationRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?;

                    Ok(match inserted {
                        Some(row) => InsertOutcome::Inserted(row.into()),
                        None => InsertOutcome::DuplicateViolation,
                    })
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => map_insert_fault(classify(err, "registrations.try_insert")),
        }
    }

    async fn remove(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<RemoveOutcome, RegistrationStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let deleted = diesel::delete(
            registrations::table
                .filter(registrations::user_id.eq(user_id.get()))
                .filter(registrations::event_id.eq(event_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_fault(classify(err, "registrations.remove")))?;

        Ok(if deleted == 0 {
            RemoveOutcome::Absent
        } else {
            RemoveOutcome::Removed
        })
    }

    async fn roster(&self, event_id: EventId) -> Result<Vec<Username>, RegistrationStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let rows: Vec<(i64, Option<String>)> = registrations::table
            .left_join(users::table)
            .filter(registrations::event_id.eq(event_id.get()))
            .select((registrations::user_id, users::username.nullable()))
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "registrations.roster")))?;

        let mut usernames = rows
            .into_iter()
            .map(|(user_id, username)| {
                let username = username.ok_or_else(|| {
                    RegistrationStoreError::integrity(format!(
                        "registration for event {event_id} references missing user {user_id}"
                    ))
                })?;
                Username::new(username).map_err(|err| {
                    RegistrationStoreError::integrity(format!("user {user_id}: {err}"))
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
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let ids: Vec<i64> = registrations::table
            .filter(registrations::user_id.eq(user_id.get()))
            .select(registrations::event_id)
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "registrations.event_ids_for_user")))?;

        Ok(ids.into_iter().map(EventId::new).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for registration store error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unique_violation_during_insert_is_a_duplicate() {
        let outcome = map_insert_fault(DieselFault::UniqueViolation {
            constraint: Some("registrations_user_event_key".to_owned()),
        })
        .expect("constraint answers the question");
        assert_eq!(outcome, InsertOutcome::DuplicateViolation);
    }

    #[rstest]
    fn foreign_key_violation_during_insert_is_missing_reference() {
        let outcome =
            map_insert_fault(DieselFault::ForeignKeyViolation).expect("constraint answers");
        assert_eq!(outcome, InsertOutcome::MissingReference);
    }

    #[rstest]
    #[case(DieselFault::Connection("closed".to_owned()), true)]
    #[case(DieselFault::Contention("could not serialize access".to_owned()), true)]
    #[case(DieselFault::Query("syntax".to_owned()), false)]
    fn other_insert_faults_propagate(#[case] fault: DieselFault, #[case] transient: bool) {
        let err = map_insert_fault(fault).expect_err("fault propagates");
        assert_eq!(err.is_transient(), transient);
    }

    #[rstest]
    fn negative_counts_are_rejected() {
        assert!(to_count(-1).is_err());
        assert_eq!(to_count(4).expect("non-negative"), 4);
    }
}
