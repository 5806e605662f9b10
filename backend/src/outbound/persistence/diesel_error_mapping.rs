//! Shared classification of Diesel failures for the enrollment repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Diesel failure reduced to what the repositories need to decide on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFault {
    /// The connection was lost or never established.
    Connection(String),
    /// Serialisation failure or deadlock; the transaction may be retried.
    Contention(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write.
    ForeignKeyViolation,
    /// Anything else.
    Query(String),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError, operation: &'static str) -> DieselFault {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DieselFault::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            DieselFault::Contention(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFault::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DieselFault::ForeignKeyViolation
        }
        DieselError::DatabaseError(_, info) if is_deadlock(info.message()) => {
            DieselFault::Contention(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => DieselFault::Query(info.message().to_owned()),
        DieselError::BrokenTransactionManager => {
            DieselFault::Connection("transaction manager is broken".to_owned())
        }
        DieselError::NotFound => DieselFault::Query("record not found".to_owned()),
        other => DieselFault::Query(other.to_string()),
    }
}

/// Pool failures are always connection faults.
pub(crate) fn pool_fault(error: PoolError) -> DieselFault {
    DieselFault::Connection(error.into_message())
}

fn is_deadlock(message: &str) -> bool {
    message.to_ascii_lowercase().contains("deadlock detected")
}
