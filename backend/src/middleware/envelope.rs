//! Response envelope middleware.
//!
//! Issues the per-response request identifier and normalizes successful
//! JSON payloads into the standard envelope:
//! `{success, data, message, timestamp}`. Payloads already carrying
//! `success` or `error` keys pass through untouched, which makes wrapping
//! idempotent and keeps error envelopes intact.

use std::task::{Context, Poll};

use actix_web::body::{BoxBody, to_bytes};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use chrono::Utc;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::{Value, json};
use uuid::Uuid;

/// Opaque per-response identifier, `req_`-prefixed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed status-to-message table for the success envelope.
#[must_use]
pub fn status_message(status: u16) -> &'static str {
    match status {
        200 => "Success",
        201 => "Created successfully",
        204 => "Deleted successfully",
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        422 => "Validation error",
        429 => "Too many requests",
        500 => "Internal server error",
        _ => "Request processed",
    }
}

fn is_enveloped(payload: &Value) -> bool {
    payload
        .as_object()
        .is_some_and(|object| object.contains_key("success") || object.contains_key("error"))
}

/// Wrap a payload into the standard envelope; a no-op for payloads that
/// already carry `success`/`error` keys.
#[must_use]
pub fn wrap(payload: Value, status: u16, timestamp: &str) -> Value {
    if is_enveloped(&payload) {
        return payload;
    }
    json!({
        "success": (200..300).contains(&status),
        "data": payload,
        "message": status_message(status),
        "timestamp": timestamp,
    })
}

/// Envelope middleware; apply with `App::new().wrap(Envelope)`.
#[derive(Clone)]
pub struct Envelope;

impl<S, B> Transform<S, ServiceRequest> for Envelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = EnvelopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(EnvelopeMiddleware { service }))
    }
}

/// Service wrapper produced by [`Envelope`].
pub struct EnvelopeMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for EnvelopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId::generate();
        req.extensions_mut().insert(request_id.clone());
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let mut res = normalize_body(res.map_into_boxed_body()).await?;
            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }
            Ok(res)
        })
    }
}

async fn normalize_body(
    res: ServiceResponse<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return Ok(res);
    }

    let status = res.status().as_u16();
    let (req, res) = res.into_parts();
    let (head, body) = res.into_parts();
    let bytes = to_bytes(body)
        .await
        .map_err(|_| actix_web::error::ErrorInternalServerError("failed to buffer response body"))?;

    if bytes.is_empty() {
        return Ok(ServiceResponse::new(req, head.set_body(BoxBody::new(bytes))));
    }
    let Ok(payload) = serde_json::from_slice::<Value>(&bytes) else {
        return Ok(ServiceResponse::new(req, head.set_body(BoxBody::new(bytes))));
    };
    if is_enveloped(&payload) {
        return Ok(ServiceResponse::new(req, head.set_body(BoxBody::new(bytes))));
    }

    let wrapped = wrap(payload, status, &Utc::now().to_rfc3339());
    let body = serde_json::to_vec(&wrapped).map_err(actix_web::error::ErrorInternalServerError)?;
    let mut res = head.set_body(BoxBody::new(body));
    res.headers_mut().remove(CONTENT_LENGTH);
    Ok(ServiceResponse::new(req, res))
}
