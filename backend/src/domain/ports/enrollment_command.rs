//! Driving port for enrollment mutations.
//!
//! Inbound adapters resolve the caller's identity first and pass it in
//! explicitly; the port never reads ambient session state.

use async_trait::async_trait;

use crate::domain::{EnrollmentError, EnrollmentOutcome, EventId, UserId, WithdrawalOutcome};

/// Domain use-case port for joining and leaving events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll `user_id` in `event_id`, respecting capacity and uniqueness.
    async fn enroll(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<EnrollmentOutcome, EnrollmentError>;

    /// Remove the user's registration for the event, releasing the seat.
    async fn withdraw(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<WithdrawalOutcome, EnrollmentError>;
}
