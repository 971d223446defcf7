//! Auth Middleware
//!
//! Runs the [`AuthGate`] in front of protected routes and hands the caller's
//! [`RequestContext`] to handlers through request extensions.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use platform::bearer::authorization_value;

use crate::application::gate::{AccessRequirement, AuthGate, RequestContext};
use crate::error::AuthError;

/// Middleware state: the gate plus the requirement of the guarded route
#[derive(Clone)]
pub struct AccessState {
    gate: AuthGate,
    requirement: Arc<AccessRequirement>,
}

impl AccessState {
    pub fn new(gate: AuthGate, requirement: AccessRequirement) -> Self {
        Self {
            gate,
            requirement: Arc::new(requirement),
        }
    }
}

/// Reject the request unless it satisfies the route's requirement
pub async fn require_access(
    State(state): State<AccessState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let context = state
        .gate
        .authorize(authorization_value(req.headers()), &state.requirement)?;

    if let Some(context) = context {
        req.extensions_mut().insert(context);
    }

    Ok(next.run(req).await)
}

/// Put a method router behind [`require_access`]
pub fn guard<S>(
    route: MethodRouter<S>,
    gate: &AuthGate,
    requirement: AccessRequirement,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        AccessState::new(gate.clone(), requirement),
        require_access,
    ))
}

/// The authenticated caller of a guarded route
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Authenticated)
            .ok_or(AuthError::Unauthorized)
    }
}
