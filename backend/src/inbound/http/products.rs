//! Product API handlers.
//!
//! ```text
//! GET    /api/products?active|available|category_id|search
//! POST   /api/products
//! GET    /api/products/sku/{sku}
//! GET    /api/products/{id}
//! PUT    /api/products/{id}   (PATCH accepted too)
//! DELETE /api/products/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, route, web};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::product::{Product, ProductFilter};
use crate::inbound::http::auth::{Authenticated, require_admin};
use crate::inbound::http::context::RequestContext;
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

/// Listing filters; the first recognized parameter wins.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    active: Option<String>,
    available: Option<String>,
    category_id: Option<i64>,
    search: Option<String>,
}

impl ProductListQuery {
    fn into_filter(self) -> ProductFilter {
        if self.active.is_some() {
            ProductFilter::Active
        } else if self.available.is_some() {
            ProductFilter::Available
        } else if let Some(id) = self.category_id {
            ProductFilter::Category(id)
        } else if let Some(term) = self.search {
            ProductFilter::Search(term)
        } else {
            ProductFilter::All
        }
    }
}

/// List products.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 422, description = "Invalid filter", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    query: web::Query<ProductListQuery>,
) -> ApiResult<web::Json<Vec<Product>>> {
    let filter = query.into_inner().into_filter();
    let products = state
        .products
        .list(&filter)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(products))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/products",
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    let product = state
        .products
        .create(payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::Created().json(product))
}

/// Fetch a product by SKU. Registered before `/{id}` so the literal
/// segment wins route matching.
#[utoipa::path(
    get,
    path = "/api/products/sku/{sku}",
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Unknown SKU", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "findProductBySku"
)]
#[get("/products/sku/{sku}")]
pub async fn find_product_by_sku(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    sku: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let product = state
        .products
        .find_by_sku(&sku)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(product))
}

/// Fetch a product.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Product>> {
    let product = state
        .products
        .get(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(product))
}

/// Update a product (full or partial body).
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[route("/products/{id}", method = "PUT", method = "PATCH")]
pub async fn update_product(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<Product>> {
    let ctx = ctx.with_user(auth.0.id);
    let product = state
        .products
        .update(*id, payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(product))
}

/// Delete a product. Admin only.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    require_admin(&auth.0, "delete products", &ctx)?;
    state
        .products
        .delete(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
