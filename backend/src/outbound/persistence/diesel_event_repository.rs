//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{Event, EventId, NewEvent};

use super::diesel_error_mapping::{DieselFault, classify, pool_fault};
use super::models::{EventRow, NewEventRow};
use super::pool::DbPool;
use super::schema::events;

/// Diesel-backed implementation of the [`EventRepository`] port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_fault(fault: DieselFault) -> EventRepositoryError {
    match fault {
        DieselFault::Connection(message) | DieselFault::Contention(message) => {
            EventRepositoryError::connection(message)
        }
        DieselFault::UniqueViolation { constraint } => EventRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("<unknown>")
        )),
        DieselFault::ForeignKeyViolation => {
            EventRepositoryError::query("unexpected foreign key violation")
        }
        DieselFault::Query(message) => EventRepositoryError::query(message),
    }
}

fn to_event(row: EventRow) -> Result<Event, EventRepositoryError> {
    Event::try_from(row).map_err(EventRepositoryError::query)
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let row: Option<EventRow> = events::table
            .find(id.get())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_fault(classify(err, "events.find_by_id")))?;

        row.map(to_event).transpose()
    }

    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let rows: Vec<EventRow> = events::table
            .order(events::id.asc())
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify(err, "events.list")))?;

        rows.into_iter().map(to_event).collect()
    }

    async fn insert_if_absent(
        &self,
        event: &NewEvent,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let capacity = i32::try_from(event.capacity.get())
            .map_err(|_| EventRepositoryError::query("event capacity exceeds storage range"))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(pool_fault(err)))?;

        let row: Option<EventRow> = diesel::insert_into(events::table)
            .values(&NewEventRow {
                name: event.name.as_ref(),
                capacity,
            })
            .on_conflict(events::name)
            .do_nothing()
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_fault(classify(err, "events.insert_if_absent")))?;

        row.map(to_event).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn contention_maps_to_transient_connection_error() {
        let err = map_fault(DieselFault::Contention("could not serialize".to_owned()));
        assert!(err.is_transient());
    }

    #[rstest]
    fn invalid_rows_surface_as_query_errors() {
        let err = to_event(EventRow {
            id: 1,
            name: String::new(),
            capacity: 10,
        })
        .expect_err("blank name");
        assert!(matches!(err, EventRepositoryError::Query { .. }));
    }
}
