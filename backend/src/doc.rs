//! OpenAPI documentation configuration.
//!
//! The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Category, Post, Product};
use crate::inbound::http::error::{DebugInfo, ErrorBody, ErrorPayload, ResponseMeta};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("API token issued by the identity upstream."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront backend API",
        description = "CRUD interface over products, categories, and posts \
                       with a uniform response envelope."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::find_product_by_sku,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::find_category_by_slug,
        crate::inbound::http::categories::category_products,
        crate::inbound::http::categories::category_posts,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::find_post_by_slug,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::publish_post,
        crate::inbound::http::posts::unpublish_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Product,
        Category,
        Post,
        ErrorBody,
        ErrorPayload,
        ResponseMeta,
        DebugInfo,
    ))
)]
pub struct ApiDoc;
