//! Account API handlers.
//!
//! ```text
//! POST /api/v1/signup {"username":"ada","password":"s3cret"}
//! POST /api/v1/login {"username":"ada","password":"s3cret"}
//! POST /api/v1/logout
//! GET /api/v1/me
//! GET /api/v1/me/enrollments
//! ```

use std::collections::BTreeSet;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, EventId, LoginCredentials, LoginValidationError, SignupCredentials, User,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Credentials body shared by `POST /signup` and `POST /login`.
///
/// Example JSON:
/// `{"username":"ada","password":"s3cret"}`
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<CredentialsRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

impl TryFrom<CredentialsRequest> for SignupCredentials {
    type Error = LoginValidationError;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Event ids the current user is enrolled in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentsResponse {
    #[schema(value_type = Vec<i64>)]
    pub event_ids: BTreeSet<EventId>,
}

fn map_credentials_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
        LoginValidationError::InvalidUsername(inner) => {
            let code = match inner {
                UserValidationError::EmptyUsername => "empty_username",
                UserValidationError::UsernameTooLong { .. } => "username_too_long",
                UserValidationError::UsernameInvalidCharacters => "username_invalid_characters",
            };
            Error::invalid_request(inner.to_string())
                .with_details(json!({ "field": "username", "code": code }))
        }
    }
}

/// Create an account. New accounts are never administrators.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = SignupCredentials::try_from(payload.into_inner())
        .map_err(map_credentials_validation_error)?;
    let user = state.accounts.signup(&credentials).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())
        .map_err(map_credentials_validation_error)?;
    let user = state.accounts.authenticate(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user))
}

/// Clear the session. Succeeds whether or not anyone was logged in.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the logged-in account.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user = require_user(state.accounts.as_ref(), &session).await?;
    Ok(web::Json(user))
}

/// List the ids of events the logged-in user is enrolled in.
#[utoipa::path(
    get,
    path = "/api/v1/me/enrollments",
    responses(
        (status = 200, description = "Enrolled event ids", body = EnrollmentsResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listMyEnrollments"
)]
#[get("/me/enrollments")]
pub async fn my_enrollments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<EnrollmentsResponse>> {
    let user = require_user(state.accounts.as_ref(), &session).await?;
    let event_ids = state.rosters.list_user_enrollments(user.id()).await?;
    Ok(web::Json(EnrollmentsResponse { event_ids }))
}
