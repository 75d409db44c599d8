//! Explicit per-request context.
//!
//! Replaces ambient "current request"/"current user" lookups: every value
//! the error envelope needs travels in this struct, captured once at the
//! adapter boundary and passed into the pipeline explicitly.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::LogContext;
use crate::middleware::RequestId;

/// Debug switch carried in app data; controls the `debug` envelope block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMode(pub bool);

/// Request metadata attached to every error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub endpoint: String,
    pub method: String,
    pub user_id: Option<i64>,
    pub debug: bool,
}

impl RequestContext {
    /// Capture context from an HTTP request. The request id is taken from
    /// the envelope middleware when present, otherwise freshly generated so
    /// the invariant "unique id per response" holds even without it.
    #[must_use]
    pub fn from_http(req: &HttpRequest) -> Self {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map_or_else(|| RequestId::generate().as_str().to_owned(), |id| {
                id.as_str().to_owned()
            });
        let debug = req
            .app_data::<web::Data<DebugMode>>()
            .map(|mode| mode.0)
            .unwrap_or_default();
        Self {
            request_id,
            endpoint: req.path().to_owned(),
            method: req.method().as_str().to_owned(),
            user_id: None,
            debug,
        }
    }

    /// Record the authenticated actor.
    #[must_use]
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// View for the taxonomy's boundary logging.
    #[must_use]
    pub fn log_context(&self) -> LogContext<'_> {
        LogContext {
            actor_id: self.user_id,
            endpoint: &self.endpoint,
            method: &self.method,
        }
    }
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_http(req)))
    }
}
