//! Post API handlers, including the publish transitions.

use actix_web::{HttpResponse, delete, get, post, route, web};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::post::{Post, PostFilter};
use crate::inbound::http::auth::{Authenticated, require_admin};
use crate::inbound::http::context::RequestContext;
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

/// Listing filters; the first recognized parameter wins.
#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    published: Option<String>,
    user_id: Option<i64>,
    category_id: Option<i64>,
}

impl PostListQuery {
    fn into_filter(self) -> PostFilter {
        if self.published.is_some() {
            PostFilter::Published
        } else if let Some(id) = self.user_id {
            PostFilter::User(id)
        } else if let Some(id) = self.category_id {
            PostFilter::Category(id)
        } else {
            PostFilter::All
        }
    }
}

/// List posts.
#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 422, description = "Invalid filter", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<Vec<Post>>> {
    let filter = query.into_inner().into_filter();
    let posts = state
        .posts
        .list(&filter)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(posts))
}

/// Create a post.
#[utoipa::path(
    post,
    path = "/api/posts",
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    let post = state
        .posts
        .create(payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::Created().json(post))
}

/// Fetch a post by slug. Registered before `/{id}`.
#[utoipa::path(
    get,
    path = "/api/posts/slug/{slug}",
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Unknown slug", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "findPostBySlug"
)]
#[get("/posts/slug/{slug}")]
pub async fn find_post_by_slug(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    slug: web::Path<String>,
) -> ApiResult<web::Json<Post>> {
    let post = state
        .posts
        .find_by_slug(&slug)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(post))
}

/// Fetch a post.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Post>> {
    let post = state.posts.get(*id).await.map_err(|err| ctx.reject(err))?;
    Ok(web::Json(post))
}

/// Update a post (full or partial body).
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[route("/posts/{id}", method = "PUT", method = "PATCH")]
pub async fn update_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<Post>> {
    let ctx = ctx.with_user(auth.0.id);
    let post = state
        .posts
        .update(*id, payload.into_inner())
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(post))
}

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/publish",
    responses(
        (status = 200, description = "Post published", body = Post),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "publishPost"
)]
#[post("/posts/{id}/publish")]
pub async fn publish_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Post>> {
    let ctx = ctx.with_user(auth.0.id);
    let post = state
        .posts
        .publish(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(post))
}

/// Unpublish a post.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/unpublish",
    responses(
        (status = 200, description = "Post unpublished", body = Post),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "unpublishPost"
)]
#[post("/posts/{id}/unpublish")]
pub async fn unpublish_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Post>> {
    let ctx = ctx.with_user(auth.0.id);
    let post = state
        .posts
        .unpublish(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(web::Json(post))
}

/// Delete a post. Admin only; published posts are refused.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 409, description = "Post still published", body = ErrorBody),
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    auth: Authenticated,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ctx = ctx.with_user(auth.0.id);
    require_admin(&auth.0, "delete posts", &ctx)?;
    state
        .posts
        .delete(*id)
        .await
        .map_err(|err| ctx.reject(err))?;
    Ok(HttpResponse::NoContent().finish())
}
