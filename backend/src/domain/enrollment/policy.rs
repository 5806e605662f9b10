//! Retry and time-budget policy for enrollment operations.

use std::num::NonZeroU32;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);
const DEFAULT_BUDGET: Duration = Duration::from_secs(5);
const DEFAULT_BACKOFF: Duration = Duration::from_millis(50);

/// Bounds on how hard the enrollment core tries before giving up.
///
/// Transient store faults are retried up to `max_attempts` times in total,
/// sleeping `backoff * attempt` between tries. The whole call, retries
/// included, must finish within `budget`.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use eventhub::domain::EnrollmentPolicy;
///
/// let policy = EnrollmentPolicy::default()
///     .with_max_attempts(5)
///     .with_budget(Duration::from_secs(2));
/// assert_eq!(policy.max_attempts(), 5);
/// assert_eq!(policy.budget(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentPolicy {
    max_attempts: NonZeroU32,
    budget: Duration,
    backoff: Duration,
}

impl Default for EnrollmentPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            budget: DEFAULT_BUDGET,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl EnrollmentPolicy {
    /// Set the total number of attempts. Zero is treated as one.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
        self
    }

    /// Set the overall time budget.
    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Set the base backoff between attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub(crate) fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }

    /// Budget in whole milliseconds, saturating.
    pub(crate) fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_documented_values() {
        let policy = EnrollmentPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.budget(), Duration::from_secs(5));
        assert_eq!(policy.backoff(), Duration::from_millis(50));
    }

    #[rstest]
    fn zero_attempts_clamps_to_one() {
        assert_eq!(EnrollmentPolicy::default().with_max_attempts(0).max_attempts(), 1);
    }

    #[rstest]
    #[case(1, 50)]
    #[case(2, 100)]
    #[case(3, 150)]
    fn backoff_grows_linearly(#[case] attempt: u32, #[case] expected_ms: u64) {
        let policy = EnrollmentPolicy::default();
        assert_eq!(policy.delay_after(attempt), Duration::from_millis(expected_ms));
    }
}
