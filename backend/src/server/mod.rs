//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use state_builders::{Storage, Wiring, build_http_state};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use eventhub::Trace;
#[cfg(debug_assertions)]
use eventhub::doc::ApiDoc;
use eventhub::inbound::http::admin::all_rosters;
use eventhub::inbound::http::error::{json_config, path_config};
use eventhub::inbound::http::events::{enroll, event_roster, list_events, withdraw};
use eventhub::inbound::http::health::{HealthState, live, ready};
use eventhub::inbound::http::state::HttpState;
use eventhub::inbound::http::users::{current_user, login, logout, my_enrollments, signup};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .app_data(json_config())
        .app_data(path_config())
        .service(signup)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(my_enrollments)
        .service(list_events)
        .service(enroll)
        .service(withdraw)
        .service(event_roster)
        .service(all_rosters);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server over prepared handler state.
///
/// Readiness flips once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use eventhub::domain::{BootstrapPlan, EnrollmentPolicy, NewEvent};
    use eventhub::outbound::credentials::BcryptCredentialHasher;
    use eventhub::outbound::memory::InMemoryStore;
    use serde_json::{Value, json};

    async fn deps() -> AppDependencies {
        let storage = Storage::Memory(Arc::new(InMemoryStore::new()));
        let http_state = build_http_state(
            &storage,
            Wiring {
                hasher: Arc::new(BcryptCredentialHasher::with_cost(4)),
                policy: EnrollmentPolicy::default(),
                plan: BootstrapPlan {
                    events: vec![
                        NewEvent::try_from_parts("Hackathon 2025", 1).expect("valid event"),
                    ],
                    admin: None,
                },
            },
        )
        .await
        .expect("state");
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state,
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[actix_web::test]
    async fn signup_login_enroll_round_trip() {
        let app = actix_test::init_service(build_app(deps().await)).await;

        let signup_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(json!({ "username": "ada", "password": "s3cret" }))
                .to_request(),
        )
        .await;
        assert_eq!(signup_res.status(), StatusCode::CREATED);

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "ada", "password": "s3cret" }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie");

        let enroll_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/events/1/enrollment")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(enroll_res.status(), StatusCode::CREATED);
        assert!(enroll_res.headers().contains_key("trace-id"));

        let mine = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me/enrollments")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(mine).await;
        assert_eq!(body, json!({ "eventIds": [1] }));
    }

    #[actix_web::test]
    async fn malformed_event_id_is_a_bad_request() {
        let app = actix_test::init_service(build_app(deps().await)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/events/not-a-number/roster")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
