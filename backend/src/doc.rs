//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP endpoint from the inbound layer, the domain
//! schemas they exchange, and the session cookie security scheme. Swagger UI
//! serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    EnrollmentStatus, Error, ErrorCode, Event, EventSummary, Registration, Roster, User,
    WithdrawalOutcome,
};
use crate::inbound::http::events::{EnrollmentResponse, WithdrawalResponse};
use crate::inbound::http::users::{CredentialsRequest, EnrollmentsResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "eventhub API",
        description = "Capacity-bounded event enrollment with session authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::my_enrollments,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::enroll,
        crate::inbound::http::events::withdraw,
        crate::inbound::http::events::event_roster,
        crate::inbound::http::admin::all_rosters,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Event,
        EventSummary,
        Registration,
        Roster,
        EnrollmentStatus,
        WithdrawalOutcome,
        CredentialsRequest,
        EnrollmentsResponse,
        EnrollmentResponse,
        WithdrawalResponse,
    )),
    tags(
        (name = "users", description = "Accounts and sessions"),
        (name = "events", description = "Catalogue, enrollment, and rosters"),
        (name = "admin", description = "Administrator overviews"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
