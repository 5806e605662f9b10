//! Event catalogue, enrollment, and roster handlers.
//!
//! ```text
//! GET    /api/v1/events
//! POST   /api/v1/events/{id}/enrollment
//! DELETE /api/v1/events/{id}/enrollment
//! GET    /api/v1/events/{id}/roster
//! ```
//!
//! Enrollment outcomes other than `not_found` are business results and are
//! returned as a status body rather than the error envelope.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    EnrollmentOutcome, EnrollmentStatus, Error, EventId, EventSummary, Registration, Roster,
    WithdrawalOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_admin, require_user};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body returned by `POST /events/{id}/enrollment`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[schema(value_type = i64)]
    pub event_id: EventId,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<Registration>,
}

/// Body returned by `DELETE /events/{id}/enrollment`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    #[schema(value_type = i64)]
    pub event_id: EventId,
    pub status: WithdrawalOutcome,
}

fn event_not_found(event_id: EventId) -> Error {
    Error::not_found(format!("event {event_id} not found"))
        .with_details(serde_json::json!({ "eventId": event_id }))
}

fn enrollment_response(event_id: EventId, outcome: EnrollmentOutcome) -> ApiResult<HttpResponse> {
    let Some(status) = outcome.status() else {
        return Err(event_not_found(event_id));
    };
    let (http_status, registration) = match outcome {
        EnrollmentOutcome::Enrolled(registration) => (StatusCode::CREATED, Some(registration)),
        EnrollmentOutcome::EventFull => (StatusCode::CONFLICT, None),
        EnrollmentOutcome::AlreadyEnrolled | EnrollmentOutcome::NotFound => (StatusCode::OK, None),
    };
    Ok(HttpResponse::build(http_status).json(EnrollmentResponse {
        event_id,
        status,
        registration,
    }))
}

/// List events with advisory seat counts.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "Event catalogue", body = [EventSummary]),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<EventSummary>>> {
    Ok(web::Json(state.rosters.list_events().await?))
}

/// Enroll the logged-in user in an event.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/enrollment",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 200, description = "Already enrolled", body = EnrollmentResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown event", body = Error),
        (status = 409, description = "Event is full", body = EnrollmentResponse),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "enroll"
)]
#[post("/events/{id}/enrollment")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let event_id = EventId::new(path.into_inner());
    let user = require_user(state.accounts.as_ref(), &session).await?;
    let outcome = state.enrollment.enroll(user.id(), event_id).await?;
    enrollment_response(event_id, outcome)
}

/// Release the logged-in user's seat.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/enrollment",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Withdrawn or not enrolled", body = WithdrawalResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown event", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "withdraw"
)]
#[delete("/events/{id}/enrollment")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<WithdrawalResponse>> {
    let event_id = EventId::new(path.into_inner());
    let user = require_user(state.accounts.as_ref(), &session).await?;
    match state.enrollment.withdraw(user.id(), event_id).await? {
        WithdrawalOutcome::NotFound => Err(event_not_found(event_id)),
        status => Ok(web::Json(WithdrawalResponse { event_id, status })),
    }
}

/// Roster of one event. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/roster",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Enrolled usernames", body = Roster),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrator access required", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "eventRoster"
)]
#[get("/events/{id}/roster")]
pub async fn event_roster(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Roster>> {
    require_admin(state.accounts.as_ref(), &session).await?;
    let roster = state
        .rosters
        .list_roster(EventId::new(path.into_inner()))
        .await?;
    Ok(web::Json(roster))
}
