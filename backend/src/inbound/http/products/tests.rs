//! End-to-end coverage for the product endpoints: dispatch, auth,
//! validation, and the response envelope together.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::inbound::http::{DebugMode, HttpState, api_scope, json_config, path_config, query_config};

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::with_in_memory_store()))
        .app_data(web::Data::new(DebugMode(false)))
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(api_scope())
}

fn product_payload() -> Value {
    json!({
        "name": "Hello World!",
        "description": "A demonstration product",
        "price": 49.99,
        "quantity": 5,
        "sku": "IP15001",
        "category_id": 1,
    })
}

fn assert_exactly_one_of_data_or_error(body: &Value) {
    let has_data = body.get("data").is_some();
    let has_error = body.get("error").is_some();
    assert!(
        has_data != has_error,
        "terminal responses carry exactly one of data/error: {body}"
    );
}

#[actix_web::test]
async fn create_returns_enveloped_created_response() {
    let app = actix_test::init_service(test_app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(product_payload())
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("success"), Some(&json!(true)));
    assert_eq!(body.get("message"), Some(&json!("Created successfully")));
    assert_exactly_one_of_data_or_error(&body);
    let data = body.get("data").expect("data block");
    assert_eq!(data.get("slug"), Some(&json!("hello-world")));
    assert_eq!(data.get("id"), Some(&json!(1)));
}

#[actix_web::test]
async fn list_wraps_collection_payloads() {
    let app = actix_test::init_service(test_app()).await;
    let create = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(product_payload())
        .to_request();
    actix_test::call_service(&app, create).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/products").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("message"), Some(&json!("Success")));
    let data = body.get("data").and_then(Value::as_array).expect("array data");
    assert_eq!(data.len(), 1);
}

#[actix_web::test]
async fn mutations_require_authentication() {
    let app = actix_test::init_service(test_app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/products")
        .set_json(product_payload())
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("success"), Some(&json!(false)));
    assert_exactly_one_of_data_or_error(&body);
    assert_eq!(
        body.get("error").and_then(|e| e.get("code")),
        Some(&json!("UNAUTHORIZED"))
    );
    let request_id = body
        .get("meta")
        .and_then(|m| m.get("request_id"))
        .and_then(Value::as_str)
        .expect("request id");
    assert!(request_id.starts_with("req_"));
}

#[actix_web::test]
async fn members_cannot_delete_products() {
    let app = actix_test::init_service(test_app()).await;
    let create = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(product_payload())
        .to_request();
    actix_test::call_service(&app, create).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/products/1")
            .insert_header(("Authorization", "Bearer member-token"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = actix_test::read_body_json(res).await;
    let error = body.get("error").expect("error block");
    assert_eq!(error.get("code"), Some(&json!("FORBIDDEN")));
    let details = error.get("details").expect("details");
    assert_eq!(details.get("action"), Some(&json!("delete products")));
    assert_eq!(details.get("user_id"), Some(&json!(7)));
    assert_eq!(
        body.get("meta").and_then(|m| m.get("user_id")),
        Some(&json!(7))
    );
}

#[actix_web::test]
async fn admins_delete_with_no_content() {
    let app = actix_test::init_service(test_app()).await;
    let create = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(product_payload())
        .to_request();
    actix_test::call_service(&app, create).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/products/1")
            .insert_header(("Authorization", "Bearer admin-token"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn validation_failures_list_every_field() {
    let app = actix_test::init_service(test_app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(json!({"price": -1}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = actix_test::read_body_json(res).await;
    let error = body.get("error").expect("error block");
    assert_eq!(error.get("code"), Some(&json!("VALIDATION_ERROR")));
    let errors = error
        .get("details")
        .and_then(|d| d.get("errors"))
        .and_then(Value::as_object)
        .expect("field errors");
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("price"));
}

#[actix_web::test]
async fn unknown_product_id_maps_to_product_not_found() {
    let app = actix_test::init_service(test_app()).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/products/999999")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = actix_test::read_body_json(res).await;
    assert_exactly_one_of_data_or_error(&body);
    let error = body.get("error").expect("error block");
    assert_eq!(error.get("code"), Some(&json!("PRODUCT_NOT_FOUND")));
    assert_eq!(error.get("type"), Some(&json!("ProductNotFound")));
    assert_eq!(
        error.get("details").and_then(|d| d.get("product_id")),
        Some(&json!(999_999))
    );
    assert_eq!(
        body.get("meta").and_then(|m| m.get("endpoint")),
        Some(&json!("/api/products/999999"))
    );
}

#[actix_web::test]
async fn sku_segment_wins_over_id_routes() {
    let app = actix_test::init_service(test_app()).await;
    let create = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(product_payload())
        .to_request();
    actix_test::call_service(&app, create).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/products/sku/IP15001")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body.get("data").and_then(|d| d.get("sku")),
        Some(&json!("IP15001"))
    );
}

#[actix_web::test]
async fn malformed_json_maps_to_bad_request_envelope() {
    let app = actix_test::init_service(test_app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer admin-token"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("success"), Some(&json!(false)));
    assert_eq!(
        body.get("error").and_then(|e| e.get("code")),
        Some(&json!("GENERIC_ERROR"))
    );
}

#[actix_web::test]
async fn non_numeric_id_maps_to_bad_request_envelope() {
    let app = actix_test::init_service(test_app()).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/products/not-a-number")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body.get("error").and_then(|e| e.get("code")),
        Some(&json!("GENERIC_ERROR"))
    );
}
