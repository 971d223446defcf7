//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    identity::{Identity, NewIdentity},
    role::Role,
};
pub use repository::{DeleteOutcome, IdentityRepository, RoleRepository};
pub use value_object::{email::Email, role_name::RoleName, secret::Secret};
