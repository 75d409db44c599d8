//! Bearer-token actor extraction.
//!
//! The identity upstream is opaque: this adapter only turns "no token",
//! "bad token", and "insufficient role" into the taxonomy's Unauthorized
//! and Forbidden kinds before anything reaches business logic.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::DomainError;
use crate::domain::ports::Actor;
use crate::inbound::http::context::RequestContext;
use crate::inbound::http::error::ApiError;
use crate::inbound::http::state::HttpState;

/// Extractor wrapper around the authenticated [`Actor`].
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Actor);

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let ctx = RequestContext::from_http(&req);
            let Some(state) = req.app_data::<web::Data<HttpState>>() else {
                return Err(ApiError::new(
                    DomainError::generic("identity provider is not configured"),
                    ctx,
                )
                .into());
            };
            let Some(token) = bearer_token(&req) else {
                return Err(ApiError::new(
                    DomainError::unauthorized("Authentication is required for this operation."),
                    ctx,
                )
                .into());
            };
            let actor = state
                .identity
                .verify(&token)
                .await
                .map_err(|err| ApiError::new(err, ctx))?;
            Ok(Self(actor))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Role gate for destructive operations. On refusal the envelope carries
/// the attempted action and the acting user id.
pub fn require_admin(actor: &Actor, action: &str, ctx: &RequestContext) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ctx.reject(DomainError::forbidden(action, Some(actor.id))))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::Role;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_token_requires_scheme_prefix() {
        let req = TestRequest::get()
            .insert_header((AUTHORIZATION, "Bearer admin-token"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("admin-token"));

        let bare = TestRequest::get()
            .insert_header((AUTHORIZATION, "admin-token"))
            .to_http_request();
        assert_eq!(bearer_token(&bare), None);

        let missing = TestRequest::get().to_http_request();
        assert_eq!(bearer_token(&missing), None);
    }

    #[test]
    fn require_admin_translates_to_forbidden() {
        let ctx = RequestContext {
            request_id: "req_test".into(),
            endpoint: "/api/products/1".into(),
            method: "DELETE".into(),
            user_id: Some(7),
            debug: false,
        };
        let member = Actor {
            id: 7,
            role: Role::Member,
        };
        let err = require_admin(&member, "delete products", &ctx).expect_err("member refused");
        assert_eq!(err.error().code(), "FORBIDDEN");
        assert_eq!(err.error().status_code(), 403);

        let admin = Actor {
            id: 1,
            role: Role::Admin,
        };
        assert!(require_admin(&admin, "delete products", &ctx).is_ok());
    }
}
