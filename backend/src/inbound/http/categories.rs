//! Category API handlers.

use actix_web::{HttpResponse, delete, get, post, route, web};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::category::{Category, CategoryFilter};
use crate::domain::post::Post;
use crate::domain::product::Product;
use crate::inbound::http::auth::{Authenticated, require_admin};
use crate::inbound::http::context::RequestContext;
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    active: Option<String>,
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories", body = [Category])),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    query: web::Query<CategoryListQuery>,
) -> ApiResult<web::Json<Vec<Category>>> {
    let filter = if query.active.is_some() {
        CategoryFilter::Active
    } else {
        CategoryFilter::All
    };
    let categories = state
        .categories
        .list(filter)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(categories))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/categories",
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    let category = state
        .categories
        .create(payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::Created().json(category))
}

/// Fetch a category by slug. Registered before `/{id}`.
#[utoipa::path(
    get,
    path = "/api/categories/slug/{slug}",
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Unknown slug", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "findCategoryBySlug"
)]
#[get("/categories/slug/{slug}")]
pub async fn find_category_by_slug(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    slug: web::Path<String>,
) -> ApiResult<web::Json<Category>> {
    let category = state
        .categories
        .find_by_slug(&slug)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(category))
}

/// Fetch a category.
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "getCategory"
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Category>> {
    let category = state
        .categories
        .get(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(category))
}

/// Products belonging to a category.
#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "categoryProducts"
)]
#[get("/categories/{id}/products")]
pub async fn category_products(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Product>>> {
    let products = state
        .categories
        .products_of(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(products))
}

/// Posts belonging to a category.
#[utoipa::path(
    get,
    path = "/api/categories/{id}/posts",
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "categoryPosts"
)]
#[get("/categories/{id}/posts")]
pub async fn category_posts(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Post>>> {
    let posts = state
        .categories
        .posts_of(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(posts))
}

/// Update a category (full or partial body).
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[route("/categories/{id}", method = "PUT", method = "PATCH")]
pub async fn update_category(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<Category>> {
    let ctx = ctx.with_user(auth.0.id);
    let category = state
        .categories
        .update(*id, payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(category))
}

/// Delete a category. Admin only.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    require_admin(&auth.0, "delete categories", &ctx)?;
    state
        .categories
        .delete(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::NoContent().finish())
}
