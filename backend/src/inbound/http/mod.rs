//! Inbound HTTP adapters.
//!
//! Thin dispatch only: handlers extract context, call a domain service,
//! and hand the outcome to the error/envelope machinery.

pub mod auth;
pub mod categories;
pub mod context;
pub mod error;
pub mod health;
pub mod posts;
pub mod products;
pub mod state;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{Scope, web};

use crate::domain::DomainError;
use crate::middleware::Envelope;

pub use context::{DebugMode, RequestContext};
pub use error::{ApiError, ApiResult};
pub use state::HttpState;

/// Every `/api` route, behind the envelope middleware. Literal segments
/// (`sku/…`, `slug/…`) register before their `{id}` siblings so they win
/// route matching.
#[must_use]
pub fn api_scope() -> Scope<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    web::scope("/api")
        .wrap(Envelope)
        .service(products::list_products)
        .service(products::create_product)
        .service(products::find_product_by_sku)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::find_category_by_slug)
        .service(categories::category_products)
        .service(categories::category_posts)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(posts::find_post_by_slug)
        .service(posts::publish_post)
        .service(posts::unpublish_post)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
}

/// Map malformed JSON bodies onto the standard envelope before they reach
/// business logic.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        let ctx = RequestContext::from_http(req);
        ApiError::new(
            DomainError::generic(format!("Malformed JSON body: {err}")).with_status(400),
            ctx,
        )
        .into()
    })
}

/// Map unparsable path parameters (e.g. a non-numeric id) onto the envelope.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        let ctx = RequestContext::from_http(req);
        ApiError::new(
            DomainError::generic(format!("Invalid path parameter: {err}")).with_status(400),
            ctx,
        )
        .into()
    })
}

/// Map unparsable query strings onto the envelope.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        let ctx = RequestContext::from_http(req);
        ApiError::new(
            DomainError::generic(format!("Invalid query string: {err}")).with_status(400),
            ctx,
        )
        .into()
    })
}
