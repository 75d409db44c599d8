//! HTTP error payloads and the mapping from domain errors.
//!
//! The domain stays free of transport concerns; this adapter pairs a
//! [`DomainError`] with the explicit [`RequestContext`] and renders the
//! uniform failure envelope. Typed errors pass through classification
//! untouched; they are never reclassified here.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::inbound::http::context::RequestContext;

/// Number of cause-chain entries exposed in debug output.
const TRACE_DEPTH: usize = 3;

/// Error half of the response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// Taxonomy kind name.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Stable machine code; never varies with locale.
    pub code: &'static str,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Request metadata echoed with every failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub request_id: String,
    pub endpoint: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Construction-site information, exposed only in debug mode.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebugInfo {
    pub file: String,
    pub line: u32,
    pub trace: Vec<String>,
}

/// Wire shape of a failure response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorPayload,
    pub meta: ResponseMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Domain error paired with the context of the request it failed.
///
/// Constructing one emits the taxonomy's structured log record, so every
/// failure is logged exactly once, at the boundary.
#[derive(Debug, Clone)]
pub struct ApiError {
    error: DomainError,
    context: RequestContext,
}

impl ApiError {
    #[must_use]
    pub fn new(error: DomainError, context: RequestContext) -> Self {
        error.log(&context.log_context());
        Self { error, context }
    }

    #[must_use]
    pub fn error(&self) -> &DomainError {
        &self.error
    }

    fn body(&self) -> ErrorBody {
        let details = self.error.details();
        ErrorBody {
            success: false,
            error: ErrorPayload {
                kind: self.error.kind().name(),
                code: self.error.code(),
                message: self.error.message().to_owned(),
                status_code: self.error.status_code(),
                details: if details.is_empty() {
                    None
                } else {
                    Some(Value::Object(details.clone()))
                },
            },
            meta: ResponseMeta {
                timestamp: Utc::now().to_rfc3339(),
                request_id: self.context.request_id.clone(),
                endpoint: self.context.endpoint.clone(),
                method: self.context.method.clone(),
                user_id: self.context.user_id,
            },
            debug: self.context.debug.then(|| DebugInfo {
                file: self.error.file().to_owned(),
                line: self.error.line(),
                trace: self.error.cause_chain().into_iter().take(TRACE_DEPTH).collect(),
            }),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl RequestContext {
    /// Boundary translation used by handlers: pair the typed outcome with
    /// this request's context.
    #[must_use]
    pub fn reject(&self, error: DomainError) -> ApiError {
        ApiError::new(error, self.clone())
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests;
