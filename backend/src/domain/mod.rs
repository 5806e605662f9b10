//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed entities for users, events and
//! registrations, the enrollment and roster services that operate on them,
//! and the ports through which adapters plug in. Keep types immutable and
//! document invariants and serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / Event / Registration: the persisted model.
//! - EnrollmentService: capacity-bounded, duplicate-safe enrollment.
//! - RosterService: rosters and event summaries.
//! - PasswordAccountService: sign-up and login.
//! - bootstrap: start-up seeding.

pub mod accounts;
pub mod auth;
pub mod bootstrap;
pub mod enrollment;
pub mod error;
pub mod event;
pub mod ports;
pub mod registration;
pub mod roster;
pub mod trace_id;
pub mod user;

pub use self::accounts::PasswordAccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, SignupCredentials};
pub use self::bootstrap::{AdminSeed, BootstrapError, BootstrapPlan, BootstrapReport, bootstrap};
pub use self::enrollment::{
    EnrollmentError, EnrollmentOutcome, EnrollmentPolicy, EnrollmentService, EnrollmentStatus,
    WithdrawalOutcome,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event::{Capacity, Event, EventId, EventName, EventValidationError, NewEvent};
pub use self::registration::{Registration, RegistrationId};
pub use self::roster::{EventSummary, Roster, RosterService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CredentialHash, NewUser, StoredUser, User, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use eventhub::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
