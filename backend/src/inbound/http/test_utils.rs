//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use std::sync::Arc;

use crate::domain::ports::{MockAccountService, MockEnrollmentCommand, MockRosterQuery};
use crate::domain::{User, UserId, Username};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
}

/// Build handler state from mocked driving ports.
pub fn mock_state(
    accounts: MockAccountService,
    enrollment: MockEnrollmentCommand,
    rosters: MockRosterQuery,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(enrollment),
        Arc::new(rosters),
    ))
}

/// Account mock that resolves any session id to the given user.
pub fn accounts_resolving(user: User) -> MockAccountService {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_current_user()
        .returning(move |_| Ok(user.clone()));
    accounts
}

/// Regular account used by handler tests.
pub fn member() -> User {
    User::new(
        UserId::new(7),
        Username::new("grace").expect("valid username"),
        false,
    )
}

/// Administrator account used by handler tests.
pub fn admin() -> User {
    User::new(
        UserId::new(1),
        Username::new("admin").expect("valid username"),
        true,
    )
}
