//! End-to-end HTTP flows against the in-memory store.
//!
//! The application is assembled from the library's handlers and real domain
//! services; only the database is swapped for [`InMemoryStore`].

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error as ActixError, test as actix_test, web};
use eventhub::Trace;
use eventhub::domain::{
    AdminSeed, BootstrapPlan, EnrollmentPolicy, EnrollmentService, NewEvent,
    PasswordAccountService, RosterService, Username, bootstrap,
};
use eventhub::inbound::http::error::{json_config, path_config};
use eventhub::inbound::http::state::HttpState;
use eventhub::inbound::http::{admin, events, users};
use eventhub::outbound::credentials::BcryptCredentialHasher;
use eventhub::outbound::memory::InMemoryStore;
use serde_json::{Value, json};
use zeroize::Zeroizing;

const ADMIN_PASSWORD: &str = "correct horse battery";

async fn seeded_state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryStore::new());
    let hasher = Arc::new(BcryptCredentialHasher::with_cost(4));
    let plan = BootstrapPlan {
        events: vec![
            NewEvent::try_from_parts("Tech Conference 2025", 100).expect("valid event"),
            NewEvent::try_from_parts("Rust Workshop", 2).expect("valid event"),
            NewEvent::try_from_parts("Hackathon 2025", 1).expect("valid event"),
        ],
        admin: Some(AdminSeed {
            username: Username::new("admin").expect("valid username"),
            password: Zeroizing::new(ADMIN_PASSWORD.to_owned()),
        }),
    };
    bootstrap(&plan, store.as_ref(), store.as_ref(), hasher.as_ref())
        .await
        .expect("bootstrap");

    web::Data::new(HttpState::new(
        Arc::new(PasswordAccountService::new(store.clone(), hasher)),
        Arc::new(EnrollmentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            EnrollmentPolicy::default().with_backoff(Duration::from_millis(1)),
        )),
        Arc::new(RosterService::new(store.clone(), store.clone(), store)),
    ))
}

async fn init() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = ActixError>
{
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    actix_test::init_service(
        App::new()
            .app_data(seeded_state().await)
            .app_data(json_config())
            .app_data(path_config())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .service(users::signup)
                    .service(users::login)
                    .service(users::logout)
                    .service(users::current_user)
                    .service(users::my_enrollments)
                    .service(events::list_events)
                    .service(events::enroll)
                    .service(events::withdraw)
                    .service(events::event_roster)
                    .service(admin::all_rosters),
            ),
    )
    .await
}

fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn sign_up_and_log_in<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = ActixError>,
{
    let credentials = json!({ "username": username, "password": "hunter22" });
    let signup = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(&credentials)
            .to_request(),
    )
    .await;
    assert_eq!(signup.status(), StatusCode::CREATED);
    log_in(app, &credentials).await
}

async fn log_in<S>(app: &S, credentials: &Value) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = ActixError>,
{
    let login = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(credentials)
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    session_cookie(&login)
}

async fn event_id_named<S>(app: &S, name: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = ActixError>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::get().uri("/api/v1/events").to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(res).await;
    body.as_array()
        .expect("event list")
        .iter()
        .find(|event| event["name"] == name)
        .and_then(|event| event["id"].as_i64())
        .expect("seeded event")
}

async fn enroll<S>(app: &S, cookie: &Cookie<'static>, event_id: i64) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = ActixError>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/events/{event_id}/enrollment"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

#[actix_web::test]
async fn catalogue_lists_seeded_events_in_order() {
    let app = init().await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/events").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = actix_test::read_body_json(res).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("event list")
        .iter()
        .filter_map(|event| event["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Tech Conference 2025", "Rust Workshop", "Hackathon 2025"]
    );
    assert!(
        body.as_array()
            .expect("event list")
            .iter()
            .all(|event| event["registered"] == 0)
    );
}

#[actix_web::test]
async fn last_seat_goes_to_the_first_caller() {
    let app = init().await;
    let hackathon = event_id_named(&app, "Hackathon 2025").await;
    let alice = sign_up_and_log_in(&app, "alice").await;
    let bob = sign_up_and_log_in(&app, "bob").await;

    let (status, body) = enroll(&app, &alice, hackathon).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "enrolled");

    let (status, body) = enroll(&app, &bob, hackathon).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "event_full");

    let (status, body) = enroll(&app, &alice, hackathon).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already_enrolled");
}

#[actix_web::test]
async fn withdrawing_releases_the_seat() {
    let app = init().await;
    let hackathon = event_id_named(&app, "Hackathon 2025").await;
    let alice = sign_up_and_log_in(&app, "alice").await;
    let bob = sign_up_and_log_in(&app, "bob").await;
    enroll(&app, &alice, hackathon).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/events/{hackathon}/enrollment"))
            .cookie(alice.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "withdrawn");

    let (status, _) = enroll(&app, &bob, hackathon).await;
    assert_eq!(status, StatusCode::CREATED);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me/enrollments")
            .cookie(alice)
            .to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({ "eventIds": [] }));
}

#[actix_web::test]
async fn unknown_event_is_not_found() {
    let app = init().await;
    let alice = sign_up_and_log_in(&app, "alice").await;

    let (status, body) = enroll(&app, &alice, 9_999).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn duplicate_signup_is_rejected() {
    let app = init().await;
    sign_up_and_log_in(&app, "alice").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "username": "alice", "password": "another1" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn rosters_are_reserved_for_the_administrator() {
    let app = init().await;
    let workshop = event_id_named(&app, "Rust Workshop").await;
    let carol = sign_up_and_log_in(&app, "carol").await;
    let alice = sign_up_and_log_in(&app, "alice").await;
    enroll(&app, &carol, workshop).await;
    enroll(&app, &alice, workshop).await;

    let forbidden = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{workshop}/roster"))
            .cookie(alice)
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let admin = log_in(
        &app,
        &json!({ "username": "admin", "password": ADMIN_PASSWORD }),
    )
    .await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{workshop}/roster"))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["usernames"], json!(["alice", "carol"]));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/rosters")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.as_array().expect("rosters").len(), 3);
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let app = init().await;
    let alice = sign_up_and_log_in(&app, "alice").await;

    let logout = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(alice)
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&logout);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
