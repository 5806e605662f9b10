//! Event model: capacity-limited gatherings users can enrol in.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum allowed length for an event name, in characters.
pub const EVENT_NAME_MAX: usize = 150;

/// Validation errors for event fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("event name must not be empty")]
    EmptyName,
    #[error("event name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("event capacity must be a positive integer")]
    NonPositiveCapacity,
}

/// Stable event identifier assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as stored.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable event name, unique across events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Hackathon 2025")]
pub struct EventName(String);

impl EventName {
    /// Validate and construct an [`EventName`]; surrounding whitespace is trimmed.
    pub fn new(raw: impl Into<String>) -> Result<Self, EventValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EventValidationError::EmptyName);
        }
        if trimmed.chars().count() > EVENT_NAME_MAX {
            return Err(EventValidationError::NameTooLong {
                max: EVENT_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EventName> for String {
    fn from(value: EventName) -> Self {
        value.0
    }
}

impl TryFrom<String> for EventName {
    type Error = EventValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum number of registrations an event may hold. Always positive.
///
/// # Examples
/// ```
/// use eventhub::domain::Capacity;
///
/// assert!(Capacity::new(0).is_err());
/// assert_eq!(Capacity::new(3).expect("positive").get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u32", into = "u32")]
#[schema(value_type = u32, example = 100)]
pub struct Capacity(NonZeroU32);

impl Capacity {
    /// Validate and construct a capacity.
    pub fn new(raw: u32) -> Result<Self, EventValidationError> {
        NonZeroU32::new(raw)
            .map(Self)
            .ok_or(EventValidationError::NonPositiveCapacity)
    }

    /// Capacity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether `registered` seats saturate this capacity.
    #[must_use]
    pub fn is_saturated_by(self, registered: u64) -> bool {
        registered >= u64::from(self.get())
    }

    /// Seats left once `registered` seats are taken, floored at zero.
    #[must_use]
    pub fn remaining_after(self, registered: u64) -> u64 {
        u64::from(self.get()).saturating_sub(registered)
    }
}

impl From<Capacity> for u32 {
    fn from(value: Capacity) -> Self {
        value.get()
    }
}

impl TryFrom<u32> for Capacity {
    type Error = EventValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An event as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[schema(value_type = i64, example = 1)]
    pub id: EventId,
    pub name: EventName,
    pub capacity: Capacity,
}

/// Insert payload for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: EventName,
    pub capacity: Capacity,
}

impl NewEvent {
    /// Validate raw fields into an insert payload.
    pub fn try_from_parts(name: &str, capacity: u32) -> Result<Self, EventValidationError> {
        Ok(Self {
            name: EventName::new(name)?,
            capacity: Capacity::new(capacity)?,
        })
    }
}
