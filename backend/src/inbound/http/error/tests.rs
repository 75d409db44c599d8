//! Regression coverage for the failure envelope.

use super::*;
use actix_web::body::to_bytes;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("socket closed")]
struct FakeDriverError;

fn context() -> RequestContext {
    RequestContext {
        request_id: "req_test".into(),
        endpoint: "/api/products/1".into(),
        method: "GET".into(),
        user_id: None,
        debug: false,
    }
}

async fn body_of(err: &ApiError) -> Value {
    let response = err.error_response();
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("error envelope JSON")
}

#[actix_web::test]
async fn envelope_carries_error_and_meta_never_data() {
    let err = ApiError::new(DomainError::product_not_found(999_999), context());
    assert_eq!(err.status_code().as_u16(), 404);

    let body = body_of(&err).await;
    assert_eq!(body.get("success"), Some(&json!(false)));
    assert!(body.get("data").is_none(), "data never appears on failures");

    let error = body.get("error").expect("error block");
    assert_eq!(error.get("type"), Some(&json!("ProductNotFound")));
    assert_eq!(error.get("code"), Some(&json!("PRODUCT_NOT_FOUND")));
    assert_eq!(error.get("status_code"), Some(&json!(404)));
    assert_eq!(
        error.get("details").and_then(|d| d.get("product_id")),
        Some(&json!(999_999))
    );

    let meta = body.get("meta").expect("meta block");
    assert_eq!(meta.get("request_id"), Some(&json!("req_test")));
    assert_eq!(meta.get("endpoint"), Some(&json!("/api/products/1")));
    assert_eq!(meta.get("method"), Some(&json!("GET")));
    assert!(meta.get("user_id").is_none(), "anonymous requests omit user_id");
    assert!(meta.get("timestamp").is_some());
}

#[actix_web::test]
async fn meta_includes_actor_when_authenticated() {
    let ctx = context().with_user(42);
    let body = body_of(&ApiError::new(
        DomainError::forbidden("delete products", Some(42)),
        ctx,
    ))
    .await;
    assert_eq!(
        body.get("meta").and_then(|m| m.get("user_id")),
        Some(&json!(42))
    );
    assert_eq!(
        body.get("error").and_then(|e| e.get("details")).and_then(|d| d.get("action")),
        Some(&json!("delete products"))
    );
}

#[actix_web::test]
async fn empty_details_are_omitted() {
    let body = body_of(&ApiError::new(DomainError::generic("boom"), context())).await;
    assert!(body.get("error").and_then(|e| e.get("details")).is_none());
}

#[actix_web::test]
async fn debug_block_requires_debug_mode() {
    let plain = body_of(&ApiError::new(
        DomainError::database("create", FakeDriverError, serde_json::Map::new()),
        context(),
    ))
    .await;
    assert!(plain.get("debug").is_none(), "no stack details by default");

    let mut ctx = context();
    ctx.debug = true;
    let verbose = body_of(&ApiError::new(
        DomainError::database("create", FakeDriverError, serde_json::Map::new()),
        ctx,
    ))
    .await;
    let debug = verbose.get("debug").expect("debug block");
    assert!(debug.get("file").is_some());
    assert!(debug.get("line").is_some());
    assert_eq!(
        debug.get("trace"),
        Some(&json!(["socket closed"])),
        "cause chain surfaces in trace"
    );
}

#[actix_web::test]
async fn generic_status_override_reaches_the_wire() {
    let err = ApiError::new(
        DomainError::generic("Cannot delete a published post. Unpublish it first.")
            .with_status(409),
        context(),
    );
    assert_eq!(err.status_code().as_u16(), 409);
    let body = body_of(&err).await;
    assert_eq!(
        body.get("error").and_then(|e| e.get("status_code")),
        Some(&json!(409))
    );
    assert_eq!(
        body.get("error").and_then(|e| e.get("code")),
        Some(&json!("GENERIC_ERROR"))
    );
}
