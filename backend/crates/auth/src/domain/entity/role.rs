//! Role Entity

use kernel::id::RoleId;
use serde::Serialize;

use crate::domain::value_object::role_name::RoleName;

/// A stored role row; referenced by identities, never owned by them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}
