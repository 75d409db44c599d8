//! Driving port for the upstream identity capability.
//!
//! Token issuance and verification internals live outside this service;
//! the pipeline only needs "who is acting", so the port resolves a bearer
//! token to an authenticated actor or a typed Unauthorized error.

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Permission tier attached to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Admin,
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Domain port resolving bearer tokens to actors.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a token; unknown or expired tokens yield Unauthorized.
    async fn verify(&self, token: &str) -> Result<Actor, DomainError>;
}

/// In-memory token table used until a real identity upstream is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Actor, DomainError> {
        match token {
            "admin-token" => Ok(Actor {
                id: 1,
                role: Role::Admin,
            }),
            "member-token" => Ok(Actor {
                id: 7,
                role: Role::Member,
            }),
            _ => Err(DomainError::unauthorized(
                "The supplied API token is invalid or expired.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("admin-token", Some(Role::Admin))]
    #[case("member-token", Some(Role::Member))]
    #[case("stale-token", None)]
    #[case("", None)]
    #[tokio::test]
    async fn fixture_provider_resolves_known_tokens(
        #[case] token: &str,
        #[case] expected: Option<Role>,
    ) {
        let provider = FixtureIdentityProvider;
        match (provider.verify(token).await, expected) {
            (Ok(actor), Some(role)) => assert_eq!(actor.role, role),
            (Err(err), None) => assert_eq!(err.kind(), ErrorKind::Unauthorized),
            (Ok(actor), None) => panic!("expected rejection, got actor {actor:?}"),
            (Err(err), Some(_)) => panic!("expected actor, got error {err}"),
        }
    }

    #[test]
    fn admin_check_follows_role() {
        assert!(Actor { id: 1, role: Role::Admin }.is_admin());
        assert!(!Actor { id: 2, role: Role::Member }.is_admin());
    }
}
