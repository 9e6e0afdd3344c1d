//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ConfigError};
pub use state_builders::{
    Adapters, Repositories, ServiceOptions, StartupError, build_http_state,
};

use std::net::SocketAddr;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{
    forgot_password, login, logout, me, register, reset_password, update_details,
    update_password,
};
use crate::inbound::http::bootcamps::{
    bootcamps_in_radius, create_bootcamp, delete_bootcamp, get_bootcamp, list_bootcamps,
    update_bootcamp, upload_bootcamp_photo,
};
use crate::inbound::http::courses::{
    add_course, delete_course, get_course, list_bootcamp_courses, list_courses, update_course,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::reviews::{
    add_review, delete_review, get_review, list_bootcamp_reviews, list_reviews, update_review,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::inbound::http::validation::json_config;

/// Shared state handed to every worker's `App`.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
}

/// Every `/api/v1` resource route.
///
/// Literal segments (`radius`) are registered before the `{id}` routes
/// they would otherwise be captured by.
fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(update_details)
        .service(update_password)
        .service(forgot_password)
        .service(reset_password)
        .service(bootcamps_in_radius)
        .service(list_bootcamps)
        .service(create_bootcamp)
        .service(get_bootcamp)
        .service(update_bootcamp)
        .service(delete_bootcamp)
        .service(upload_bootcamp_photo)
        .service(list_bootcamp_courses)
        .service(add_course)
        .service(list_bootcamp_reviews)
        .service(add_review)
        .service(list_courses)
        .service(get_course)
        .service(update_course)
        .service(delete_course)
        .service(list_reviews)
        .service(get_review)
        .service(update_review)
        .service(delete_review)
        .service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
}

/// Build the application with routes, JSON limits and tracing.
pub fn build_app(
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
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the HTTP server and mark the service ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    deps: AppDependencies,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let health_state = deps.health_state.clone();
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    use super::*;
    use crate::test_support::TestContext;

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/api/v1/bootcamps", StatusCode::OK)]
    #[case("/api/v1/bootcamps/radius/02118/10", StatusCode::OK)]
    #[case("/api/v1/auth/me", StatusCode::UNAUTHORIZED)]
    #[case("/api/v1/users", StatusCode::UNAUTHORIZED)]
    #[case("/api/v1/bootcamps/not-an-id", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] uri: &str, #[case] expected: StatusCode) {
        let context = TestContext::new();
        let app = test::init_service(build_app(context.dependencies())).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), expected, "GET {uri}");
    }

    #[actix_web::test]
    async fn readiness_reflects_health_state() {
        let context = TestContext::new();
        let deps = context.dependencies();
        let app = test::init_service(build_app(deps.clone())).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        deps.health_state.mark_ready();
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
