//! Server construction and middleware wiring.

mod config;

pub use config::AppConfig;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::{
    DebugMode, HttpState, api_scope, json_config, path_config, query_config,
};

/// Assemble the application: state, extractor error handlers, the envelope
/// middleware, API routes, health probes, and Swagger UI in debug builds.
pub fn build_app(
    state: HttpState,
    health_state: web::Data<HealthState>,
    debug: DebugMode,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(debug))
        .app_data(health_state)
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Run the HTTP server until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let state = HttpState::with_in_memory_store();
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let debug = DebugMode(config.debug);

    let server = HttpServer::new(move || {
        build_app(state.clone(), server_health_state.clone(), debug)
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
