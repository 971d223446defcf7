//! Auth Gate
//!
//! Per-request access decision: header → token → claims → role check.
//! Token validation always happens before the role check, and nothing is
//! cached between requests.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use platform::bearer::parse_bearer;

use crate::application::token::{Claims, TokenCodec};
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

/// What a route demands of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Anyone; no identity is established even if a token is sent
    Public,
    /// Any valid, unexpired token
    AuthenticatedOnly,
    /// A valid token holding at least one of these roles
    RequiresAnyOf(BTreeSet<RoleName>),
}

impl AccessRequirement {
    pub fn any_of(roles: impl IntoIterator<Item = RoleName>) -> Self {
        AccessRequirement::RequiresAnyOf(roles.into_iter().collect())
    }
}

/// The authenticated caller, as established from the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub identity_id: IdentityId,
    pub roles: BTreeSet<RoleName>,
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            identity_id: claims.sub,
            roles: claims.roles,
        }
    }
}

#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Decide on a raw `Authorization` header value
    ///
    /// ## Arguments
    /// * `authorization` - The header as sent, `None` when absent
    /// * `requirement` - What the route demands
    ///
    /// ## Returns
    /// The caller's context; `Ok(None)` only for public routes.
    /// `Unauthorized` without a valid token, `Forbidden` without a
    /// required role.
    pub fn authorize(
        &self,
        authorization: Option<&str>,
        requirement: &AccessRequirement,
    ) -> AuthResult<Option<RequestContext>> {
        self.authorize_at(authorization, requirement, Utc::now())
    }

    pub fn authorize_at(
        &self,
        authorization: Option<&str>,
        requirement: &AccessRequirement,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<RequestContext>> {
        match requirement {
            AccessRequirement::Public => Ok(None),
            AccessRequirement::AuthenticatedOnly => {
                let claims = self.authenticate(authorization, now)?;
                Ok(Some(RequestContext::from(claims)))
            }
            AccessRequirement::RequiresAnyOf(required) => {
                let claims = self.authenticate(authorization, now)?;
                if !claims.has_any_role(required) {
                    tracing::warn!(
                        identity_id = %claims.sub,
                        held = ?claims.roles,
                        required = ?required,
                        "Access denied"
                    );
                    return Err(AuthError::Forbidden);
                }
                Ok(Some(RequestContext::from(claims)))
            }
        }
    }

    fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<Claims> {
        let token = authorization
            .and_then(parse_bearer)
            .ok_or(AuthError::Unauthorized)?;

        self.codec.verify_at(token, now).map_err(|e| {
            tracing::debug!(reason = %e, "Bearer token rejected");
            AuthError::Unauthorized
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::AuthConfig;
    use crate::domain::entity::identity::{Identity, NewIdentity};
    use crate::domain::value_object::{
        display_name::DisplayName, email::Email, secret::Secret,
    };
    use chrono::{Duration, TimeZone};

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&AuthConfig::with_secret(vec![3u8; 32]).unwrap()))
    }

    fn identity(roles: &[RoleName]) -> Identity {
        roles
            .iter()
            .fold(
                NewIdentity::new(
                    Email::new("bia@oficina.com").unwrap(),
                    Secret::new("pw").unwrap(),
                    DisplayName::new("Bia").unwrap(),
                ),
                |new, role| new.with_role(*role),
            )
            .into_identity(IdentityId::from_i64(11))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn bearer(codec: &TokenCodec, roles: &[RoleName]) -> String {
        format!("Bearer {}", codec.issue_at(&identity(roles), t0()).unwrap())
    }

    #[test]
    fn test_public_ignores_token() {
        let gate = AuthGate::new(codec());
        assert_eq!(
            gate.authorize_at(None, &AccessRequirement::Public, t0()).unwrap(),
            None
        );
        assert_eq!(
            gate.authorize_at(Some("Bearer junk"), &AccessRequirement::Public, t0())
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_authenticated_only() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let header = bearer(&codec, &[RoleName::Customer]);

        let context = gate
            .authorize_at(Some(header.as_str()), &AccessRequirement::AuthenticatedOnly, t0())
            .unwrap()
            .unwrap();
        assert_eq!(context.identity_id, IdentityId::from_i64(11));
        assert!(context.roles.contains(&RoleName::Customer));

        for header in [None, Some("Bearer nope"), Some("Basic abc")] {
            let result = gate.authorize_at(header, &AccessRequirement::AuthenticatedOnly, t0());
            assert!(matches!(result, Err(AuthError::Unauthorized)), "{header:?}");
        }
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let header = bearer(&codec, &[RoleName::Admin]);
        let later = t0() + Duration::hours(2);

        let result = gate.authorize_at(
            Some(header.as_str()),
            &AccessRequirement::any_of([RoleName::Admin]),
            later,
        );
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_requires_any_of() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let admin_only = AccessRequirement::any_of([RoleName::Admin]);
        let staff = AccessRequirement::any_of([RoleName::Admin, RoleName::Sales]);

        let customer = bearer(&codec, &[RoleName::Customer]);
        assert!(matches!(
            gate.authorize_at(Some(customer.as_str()), &admin_only, t0()),
            Err(AuthError::Forbidden)
        ));

        let seller = bearer(&codec, &[RoleName::Sales, RoleName::Customer]);
        assert!(gate.authorize_at(Some(seller.as_str()), &staff, t0()).unwrap().is_some());
        assert!(matches!(
            gate.authorize_at(Some(seller.as_str()), &admin_only, t0()),
            Err(AuthError::Forbidden)
        ));

        assert!(matches!(
            gate.authorize_at(None, &admin_only, t0()),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_admitted_context_carries_token_roles() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let header = bearer(&codec, &[RoleName::Sales, RoleName::Customer]);

        let context = gate
            .authorize_at(
                Some(header.as_str()),
                &AccessRequirement::any_of([RoleName::Sales]),
                t0(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(context.identity_id, IdentityId::from_i64(11));
        assert_eq!(
            context.roles,
            BTreeSet::from([RoleName::Customer, RoleName::Sales])
        );
    }

    #[test]
    fn test_empty_role_requirement_admits_nobody() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let header = bearer(&codec, &RoleName::ALL);
        let result = gate.authorize_at(Some(header.as_str()), &AccessRequirement::any_of([]), t0());
        assert!(matches!(result, Err(AuthError::Forbidden)));
    }
}
