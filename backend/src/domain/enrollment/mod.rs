//! Capacity-bounded, duplicate-safe enrollment.
//!
//! Business rejections (`AlreadyEnrolled`, `EventFull`, `NotFound`) are
//! ordinary outcomes. [`EnrollmentError`] is reserved for infrastructure
//! faults that left the caller without an answer.

mod policy;
mod service;


use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::{Error, Registration};

pub use policy::EnrollmentPolicy;
pub use service::EnrollmentService;

/// Result of an enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    /// A registration was durably created.
    Enrolled(Registration),
    /// The user already holds a registration for the event.
    AlreadyEnrolled,
    /// The event had no capacity left at commit time.
    EventFull,
    /// The event or the user does not exist.
    NotFound,
}

impl EnrollmentOutcome {
    /// Stable status label used by adapters.
    ///
    /// `None` for [`EnrollmentOutcome::NotFound`], which adapters report as
    /// a missing resource rather than an enrollment status.
    #[must_use]
    pub fn status(&self) -> Option<EnrollmentStatus> {
        match self {
            Self::Enrolled(_) => Some(EnrollmentStatus::Enrolled),
            Self::AlreadyEnrolled => Some(EnrollmentStatus::AlreadyEnrolled),
            Self::EventFull => Some(EnrollmentStatus::EventFull),
            Self::NotFound => None,
        }
    }
}

/// Wire label for enrollment outcomes that reached a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    AlreadyEnrolled,
    EventFull,
}

/// Result of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalOutcome {
    /// The registration was removed and its seat released.
    Withdrawn,
    /// The user held no registration for the event.
    NotEnrolled,
    /// The event or the user does not exist.
    NotFound,
}

/// Infrastructure failures surfaced by the enrollment core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    /// Transient store faults persisted through every retry.
    #[error("storage unavailable after {attempts} attempts: {message}")]
    StorageUnavailable { attempts: u32, message: String },
    /// The operation did not finish within its time budget.
    #[error("enrollment did not complete within {budget_ms} ms")]
    Timeout { budget_ms: u64 },
    /// The store returned rows that violate referential integrity.
    #[error("registration data is inconsistent: {message}")]
    ConstraintCorruption { message: String },
    /// The store rejected the operation for a non-transient reason.
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl From<EnrollmentError> for Error {
    fn from(value: EnrollmentError) -> Self {
        match value {
            EnrollmentError::StorageUnavailable { .. } => {
                Error::service_unavailable("enrollment storage is temporarily unavailable")
            }
            EnrollmentError::Timeout { budget_ms } => {
                Error::service_unavailable(format!("enrollment timed out after {budget_ms} ms"))
            }
            EnrollmentError::ConstraintCorruption { message } => {
                Error::internal(format!("registration data is inconsistent: {message}"))
            }
            EnrollmentError::Storage { message } => {
                Error::internal(format!("enrollment storage error: {message}"))
            }
        }
    }
}
