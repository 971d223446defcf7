//! Identity Entity
//!
//! A user account: login email, stored secret, display name and role set.

use std::collections::BTreeSet;

use kernel::id::IdentityId;

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, role_name::RoleName, secret::Secret,
};

/// Persisted identity
#[derive(Debug, Clone)]
pub struct Identity {
    /// Store-assigned identifier
    pub id: IdentityId,
    /// Unique login key
    pub email: Email,
    pub secret: Secret,
    pub display_name: DisplayName,
    /// Held roles; order is irrelevant
    pub roles: BTreeSet<RoleName>,
}

impl Identity {
    #[inline]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }
}

/// An identity that has not been stored yet (no id)
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: Email,
    pub secret: Secret,
    pub display_name: DisplayName,
    pub roles: BTreeSet<RoleName>,
}

impl NewIdentity {
    pub fn new(email: Email, secret: Secret, display_name: DisplayName) -> Self {
        Self {
            email,
            secret,
            display_name,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: RoleName) -> Self {
        self.roles.insert(role);
        self
    }

    /// Attach the store-assigned id
    pub fn into_identity(self, id: IdentityId) -> Identity {
        Identity {
            id,
            email: self.email,
            secret: self.secret,
            display_name: self.display_name,
            roles: self.roles,
        }
    }
}
