//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer
//! (`PgAuthRepository`, `MemoryAuthStore`).

use crate::domain::entity::{
    identity::{Identity, NewIdentity},
    role::Role,
};
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::AuthResult;
use kernel::id::IdentityId;

/// Result of the guarded identity delete
#[derive(Debug)]
pub enum DeleteOutcome {
    /// Removed; carries the row as it was
    Deleted(Identity),
    NotFound,
    /// Refused: the identity is the only ADMIN holder
    LastAdmin,
    /// Refused: orders still name the identity as owner
    StillReferenced,
}

/// Identity repository trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    /// Insert with the roles in `identity.roles`.
    /// Duplicate email fails with `AuthError::Conflict`.
    async fn create(&self, identity: &NewIdentity) -> AuthResult<Identity>;

    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>>;

    /// Exact, case-sensitive match
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// All identities sorted by display name
    async fn find_all(&self) -> AuthResult<Vec<Identity>>;

    /// Identities holding `role`, sorted by display name
    async fn find_all_by_role(&self, role: RoleName) -> AuthResult<Vec<Identity>>;

    /// Add a role to an existing identity; `false` if the identity is missing
    async fn grant_role(&self, id: IdentityId, role: RoleName) -> AuthResult<bool>;

    /// Check the last-admin and ownership rules and delete, as one atomic step
    async fn delete_guarded(&self, id: IdentityId) -> AuthResult<DeleteOutcome>;
}

/// Role repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    async fn count(&self) -> AuthResult<u64>;

    /// Insert missing roles; returns how many were created
    async fn seed(&self, names: &[RoleName]) -> AuthResult<u64>;

    async fn find_by_name(&self, name: RoleName) -> AuthResult<Option<Role>>;

    async fn list_roles(&self) -> AuthResult<Vec<Role>>;

    /// Number of identities holding `name`
    async fn members_with_role(&self, name: RoleName) -> AuthResult<u64>;
}
