//! Port for event catalogue persistence.

use async_trait::async_trait;

use crate::domain::{Event, EventId, NewEvent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
    }
}

impl EventRepositoryError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Read and seed access to events.
///
/// Events are never modified after creation; capacity is fixed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fetch an event by identifier.
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError>;

    /// List every event ordered by identifier.
    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError>;

    /// Insert an event unless one with the same name already exists.
    ///
    /// Returns `None` when the name was taken, so concurrent seeders never
    /// produce duplicates.
    async fn insert_if_absent(
        &self,
        event: &NewEvent,
    ) -> Result<Option<Event>, EventRepositoryError>;
}
