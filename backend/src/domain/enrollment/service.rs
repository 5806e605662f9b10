//! Enrollment service implementing the [`EnrollmentCommand`] driving port.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{EnrollmentError, EnrollmentOutcome, EnrollmentPolicy, WithdrawalOutcome};
use crate::domain::ports::{
    EnrollmentCommand, EventRepository, EventRepositoryError, InsertOutcome, RegistrationStore,
    RegistrationStoreError, RemoveOutcome, UserPersistenceError, UserRepository,
};
use crate::domain::{EventId, UserId};

/// Store failure classified by what the core should do about it.
#[derive(Debug)]
enum StoreFault {
    Transient(String),
    Fatal(String),
    Integrity(String),
}

impl From<EventRepositoryError> for StoreFault {
    fn from(value: EventRepositoryError) -> Self {
        if value.is_transient() {
            Self::Transient(value.to_string())
        } else {
            Self::Fatal(value.to_string())
        }
    }
}

impl From<UserPersistenceError> for StoreFault {
    fn from(value: UserPersistenceError) -> Self {
        if value.is_transient() {
            Self::Transient(value.to_string())
        } else {
            Self::Fatal(value.to_string())
        }
    }
}

impl From<RegistrationStoreError> for StoreFault {
    fn from(value: RegistrationStoreError) -> Self {
        match value {
            RegistrationStoreError::Integrity { .. } => Self::Integrity(value.to_string()),
            other if other.is_transient() => Self::Transient(other.to_string()),
            other => Self::Fatal(other.to_string()),
        }
    }
}

/// Enrollment core.
///
/// Holds no locks of its own: the [`RegistrationStore`] is the single point
/// of serialisation for capacity and uniqueness.
#[derive(Clone)]
pub struct EnrollmentService<U, E, R> {
    users: Arc<U>,
    events: Arc<E>,
    registrations: Arc<R>,
    policy: EnrollmentPolicy,
}

impl<U, E, R> EnrollmentService<U, E, R> {
    /// Create a service over the given stores.
    pub fn new(
        users: Arc<U>,
        events: Arc<E>,
        registrations: Arc<R>,
        policy: EnrollmentPolicy,
    ) -> Self {
        Self {
            users,
            events,
            registrations,
            policy,
        }
    }

    /// Policy in effect.
    pub fn policy(&self) -> EnrollmentPolicy {
        self.policy
    }
}

impl<U, E, R> EnrollmentService<U, E, R>
where
    U: UserRepository,
    E: EventRepository,
    R: RegistrationStore,
{
    async fn references_exist(&self, user_id: UserId, event_id: EventId) -> Result<bool, StoreFault> {
        if self.events.find_by_id(event_id).await?.is_none() {
            debug!(%event_id, "event not found");
            return Ok(false);
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            debug!(%user_id, "user not found");
            return Ok(false);
        }
        Ok(true)
    }

    async fn attempt_enroll(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<EnrollmentOutcome, StoreFault> {
        if !self.references_exist(user_id, event_id).await? {
            return Ok(EnrollmentOutcome::NotFound);
        }

        // Advisory only; the atomic insert decides.
        match self.registrations.count_for_event(event_id).await {
            Ok(count) => debug!(%event_id, registered = count, "pre-insert seat usage"),
            Err(err) => debug!(%event_id, error = %err, "advisory count unavailable"),
        }

        let outcome = match self.registrations.try_insert(user_id, event_id).await? {
            InsertOutcome::Inserted(registration) => EnrollmentOutcome::Enrolled(registration),
            InsertOutcome::DuplicateViolation => EnrollmentOutcome::AlreadyEnrolled,
            InsertOutcome::CapacityViolation => EnrollmentOutcome::EventFull,
            InsertOutcome::MissingReference => EnrollmentOutcome::NotFound,
        };
        Ok(outcome)
    }

    async fn attempt_withdraw(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<WithdrawalOutcome, StoreFault> {
        if !self.references_exist(user_id, event_id).await? {
            return Ok(WithdrawalOutcome::NotFound);
        }
        let outcome = match self.registrations.remove(user_id, event_id).await? {
            RemoveOutcome::Removed => WithdrawalOutcome::Withdrawn,
            RemoveOutcome::Absent => WithdrawalOutcome::NotEnrolled,
        };
        Ok(outcome)
    }

    /// Run `op` until it succeeds, fails permanently, or exhausts the
    /// attempt limit. The caller applies the time budget.
    async fn with_retries<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, EnrollmentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreFault>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(StoreFault::Transient(message)) if attempt < max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %message,
                        "transient storage fault; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(StoreFault::Transient(message)) => {
                    warn!(operation, attempts = attempt, error = %message, "storage unavailable");
                    return Err(EnrollmentError::StorageUnavailable {
                        attempts: attempt,
                        message,
                    });
                }
                Err(StoreFault::Integrity(message)) => {
                    error!(operation, error = %message, "registration integrity violation");
                    return Err(EnrollmentError::ConstraintCorruption { message });
                }
                Err(StoreFault::Fatal(message)) => {
                    error!(operation, error = %message, "storage failure");
                    return Err(EnrollmentError::Storage { message });
                }
            }
        }
    }

    async fn within_budget<T, Fut>(&self, operation: &'static str, fut: Fut) -> Result<T, EnrollmentError>
    where
        Fut: Future<Output = Result<T, EnrollmentError>>,
    {
        match tokio::time::timeout(self.policy.budget(), fut).await {
            Ok(result) => result,
            Err(_) => {
                let budget_ms = self.policy.budget_ms();
                warn!(operation, budget_ms, "operation exceeded its time budget");
                Err(EnrollmentError::Timeout { budget_ms })
            }
        }
    }
}

#[async_trait]
impl<U, E, R> EnrollmentCommand for EnrollmentService<U, E, R>
where
    U: UserRepository,
    E: EventRepository,
    R: RegistrationStore,
{
    async fn enroll(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let outcome = self
            .within_budget(
                "enroll",
                self.with_retries("enroll", || self.attempt_enroll(user_id, event_id)),
            )
            .await?;
        info!(%user_id, %event_id, outcome = ?outcome.status(), "enrollment decided");
        Ok(outcome)
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<WithdrawalOutcome, EnrollmentError> {
        let outcome = self
            .within_budget(
                "withdraw",
                self.with_retries("withdraw", || self.attempt_withdraw(user_id, event_id)),
            )
            .await?;
        info!(%user_id, %event_id, ?outcome, "withdrawal decided");
        Ok(outcome)
    }
}
