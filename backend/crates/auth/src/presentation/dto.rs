//! API DTOs (Data Transfer Objects)

use std::collections::BTreeSet;

use kernel::id::IdentityId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::role_name::RoleName;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign in response
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    /// Send back as `Authorization: Bearer <token>`
    pub token: String,
    pub user: IdentityResponse,
}

// ============================================================================
// Identity Views
// ============================================================================

/// Outward view of an identity; the secret is never included
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub id: IdentityId,
    pub name: String,
    pub email: String,
    pub roles: BTreeSet<RoleName>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.display_name.as_str().to_string(),
            email: identity.email.as_str().to_string(),
            roles: identity.roles.clone(),
        }
    }
}

/// `GET /users?role=NAME`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityListQuery {
    pub role: Option<String>,
}
