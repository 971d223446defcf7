//! In-Process Repository Implementation
//!
//! Used when no `DATABASE_URL` is configured, and by tests. Every operation
//! runs under one mutex; no lock is held across an `.await`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use kernel::id::{IdentityId, RoleId};
use parking_lot::Mutex;

use crate::domain::entity::{
    identity::{Identity, NewIdentity},
    role::Role,
};
use crate::domain::repository::{DeleteOutcome, IdentityRepository, RoleRepository};
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{AuthError, AuthResult};

/// Reports whether other data still points at an identity.
///
/// Called while the auth lock is held, so implementors must not call back
/// into the auth store.
pub trait IdentityReferences: Send + Sync {
    fn is_referenced(&self, id: IdentityId) -> bool;
}

#[derive(Default)]
struct AuthState {
    last_identity_id: i64,
    last_role_id: i64,
    identities: BTreeMap<IdentityId, Identity>,
    roles: BTreeMap<RoleName, Role>,
}

impl AuthState {
    fn check_seeded(&self, roles: &BTreeSet<RoleName>) -> AuthResult<()> {
        match roles.iter().find(|name| !self.roles.contains_key(name)) {
            Some(missing) => Err(AuthError::Internal(format!("role {missing} is not seeded"))),
            None => Ok(()),
        }
    }

    fn sorted(&self, filter: impl Fn(&Identity) -> bool) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self
            .identities
            .values()
            .filter(|identity| filter(identity))
            .cloned()
            .collect();
        identities.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then(a.id.cmp(&b.id))
        });
        identities
    }
}

/// In-memory identity and role store
#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    state: Arc<Mutex<AuthState>>,
    references: Arc<OnceLock<Arc<dyn IdentityReferences>>>,
}

impl MemoryAuthStore {
    /// Empty store; roles must be seeded before identities can hold them
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with every role already present
    pub fn with_default_roles() -> Self {
        let store = Self::new();
        store.seed_roles(&RoleName::ALL);
        store
    }

    /// Register the owner of references to identities (the order book).
    /// Only the first registration takes effect.
    pub fn set_identity_references(&self, references: Arc<dyn IdentityReferences>) {
        if self.references.set(references).is_err() {
            tracing::debug!("Identity references already registered");
        }
    }

    /// Run `f` with the auth lock held, telling it whether `id` exists.
    ///
    /// Lets another store make an existence check and its own write one
    /// atomic step with respect to identity deletion.
    pub fn with_identity<T>(&self, id: IdentityId, f: impl FnOnce(bool) -> T) -> T {
        let state = self.state.lock();
        f(state.identities.contains_key(&id))
    }

    fn seed_roles(&self, names: &[RoleName]) -> u64 {
        let mut state = self.state.lock();
        let mut created = 0;
        for name in names {
            if state.roles.contains_key(name) {
                continue;
            }
            state.last_role_id += 1;
            let role = Role {
                id: RoleId::from_i64(state.last_role_id),
                name: *name,
            };
            state.roles.insert(*name, role);
            created += 1;
        }
        created
    }
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for MemoryAuthStore {
    async fn create(&self, identity: &NewIdentity) -> AuthResult<Identity> {
        let mut state = self.state.lock();

        if state
            .identities
            .values()
            .any(|existing| existing.email == identity.email)
        {
            return Err(AuthError::Conflict);
        }
        state.check_seeded(&identity.roles)?;

        state.last_identity_id += 1;
        let stored = identity
            .clone()
            .into_identity(IdentityId::from_i64(state.last_identity_id));
        state.identities.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>> {
        Ok(self.state.lock().identities.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let state = self.state.lock();
        Ok(state
            .identities
            .values()
            .find(|identity| &identity.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock();
        Ok(state
            .identities
            .values()
            .any(|identity| &identity.email == email))
    }

    async fn find_all(&self) -> AuthResult<Vec<Identity>> {
        Ok(self.state.lock().sorted(|_| true))
    }

    async fn find_all_by_role(&self, role: RoleName) -> AuthResult<Vec<Identity>> {
        Ok(self.state.lock().sorted(|identity| identity.has_role(role)))
    }

    async fn grant_role(&self, id: IdentityId, role: RoleName) -> AuthResult<bool> {
        let mut state = self.state.lock();
        state.check_seeded(&BTreeSet::from([role]))?;

        match state.identities.get_mut(&id) {
            Some(identity) => {
                identity.roles.insert(role);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_guarded(&self, id: IdentityId) -> AuthResult<DeleteOutcome> {
        let mut state = self.state.lock();

        let Some(target_is_admin) = state.identities.get(&id).map(Identity::is_admin) else {
            return Ok(DeleteOutcome::NotFound);
        };

        if target_is_admin {
            let admins = state
                .identities
                .values()
                .filter(|identity| identity.is_admin())
                .count();
            if admins <= 1 {
                return Ok(DeleteOutcome::LastAdmin);
            }
        }

        if let Some(references) = self.references.get() {
            if references.is_referenced(id) {
                return Ok(DeleteOutcome::StillReferenced);
            }
        }

        match state.identities.remove(&id) {
            Some(identity) => Ok(DeleteOutcome::Deleted(identity)),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for MemoryAuthStore {
    async fn count(&self) -> AuthResult<u64> {
        Ok(self.state.lock().roles.len() as u64)
    }

    async fn seed(&self, names: &[RoleName]) -> AuthResult<u64> {
        Ok(self.seed_roles(names))
    }

    async fn find_by_name(&self, name: RoleName) -> AuthResult<Option<Role>> {
        Ok(self.state.lock().roles.get(&name).copied())
    }

    async fn list_roles(&self) -> AuthResult<Vec<Role>> {
        let state = self.state.lock();
        let mut roles: Vec<Role> = state.roles.values().copied().collect();
        roles.sort_by_key(|role| role.id);
        Ok(roles)
    }

    async fn members_with_role(&self, name: RoleName) -> AuthResult<u64> {
        let state = self.state.lock();
        Ok(state
            .identities
            .values()
            .filter(|identity| identity.has_role(name))
            .count() as u64)
    }
}
