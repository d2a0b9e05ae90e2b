//! # Yatube Web Server
//!
//! Blog pages, post forms and sessions over actix-web. The binary in
//! `main.rs` only loads configuration and serves [`build_app`]; tests build
//! the same app around an in-memory store.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
pub mod templating;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, web};
use tracing_actix_web::TracingLogger;

use observability::RequestIdMiddleware;
use state::AppState;

/// Largest accepted urlencoded form body. Post text has no length cap of its own.
pub const FORM_LIMIT: usize = 2_621_440;

/// The application with every route and middleware installed.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::FormConfig::default().limit(FORM_LIMIT))
        .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, handlers::render_not_found))
        .wrap(RequestIdMiddleware)
        .wrap(TracingLogger::default())
        .configure(handlers::configure_routes)
        .default_service(web::route().to(handlers::not_found))
}
