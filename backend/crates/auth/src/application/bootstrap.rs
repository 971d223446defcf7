//! Bootstrap Use Case
//!
//! Runs once before serving: seeds the role table and, when configured,
//! the first administrator. Safe to run on every start.

use std::sync::Arc;

use crate::application::config::{AuthConfig, InitialAdmin};
use crate::domain::entity::identity::NewIdentity;
use crate::domain::repository::{IdentityRepository, RoleRepository};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, role_name::RoleName, secret::Secret,
};
use crate::error::{AuthError, AuthResult};

/// What a bootstrap run changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapReport {
    pub roles_created: u64,
    pub admin_seeded: bool,
}

pub struct BootstrapUseCase<I, R>
where
    I: IdentityRepository,
    R: RoleRepository,
{
    identity_repo: Arc<I>,
    role_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<I, R> BootstrapUseCase<I, R>
where
    I: IdentityRepository,
    R: RoleRepository,
{
    pub fn new(identity_repo: Arc<I>, role_repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            identity_repo,
            role_repo,
            config,
        }
    }

    pub async fn execute(&self) -> AuthResult<BootstrapReport> {
        let roles_created = if self.role_repo.count().await? == 0 {
            let created = self.role_repo.seed(&RoleName::ALL).await?;
            tracing::info!(roles_created = created, "Role table seeded");
            created
        } else {
            tracing::debug!("Role table already populated");
            0
        };

        let admin_seeded = match &self.config.initial_admin {
            Some(admin) => self.seed_admin(admin).await?,
            None => false,
        };

        Ok(BootstrapReport {
            roles_created,
            admin_seeded,
        })
    }

    /// Make sure the configured admin exists and holds ADMIN
    ///
    /// ## Returns
    /// `true` when this run created or promoted the admin, `false` when an
    /// ADMIN already existed or another instance seeded it concurrently
    async fn seed_admin(&self, admin: &InitialAdmin) -> AuthResult<bool> {
        if self.role_repo.members_with_role(RoleName::Admin).await? > 0 {
            return Ok(false);
        }

        let email = Email::new(admin.email.clone())?;

        if let Some(existing) = self.identity_repo.find_by_email(&email).await? {
            self.identity_repo
                .grant_role(existing.id, RoleName::Admin)
                .await?;
            tracing::info!(identity_id = %existing.id, "Granted ADMIN to configured identity");
            return Ok(true);
        }

        let created = self
            .identity_repo
            .create(
                &NewIdentity::new(
                    email.clone(),
                    Secret::new(admin.password.clone())?,
                    DisplayName::new(admin.name.clone())?,
                )
                .with_role(RoleName::Admin),
            )
            .await;

        match created {
            Ok(identity) => {
                tracing::info!(identity_id = %identity.id, "Initial admin created");
                Ok(true)
            }
            // Another instance inserted the same email after our lookup
            Err(AuthError::Conflict) => {
                let existing = self
                    .identity_repo
                    .find_by_email(&email)
                    .await?
                    .ok_or_else(|| {
                        AuthError::Internal("configured admin vanished during bootstrap".into())
                    })?;
                self.identity_repo
                    .grant_role(existing.id, RoleName::Admin)
                    .await?;
                tracing::info!(identity_id = %existing.id, "Initial admin already seeded");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::identity::Identity;
    use crate::domain::repository::DeleteOutcome;
    use crate::infra::memory::MemoryAuthStore;
    use kernel::id::IdentityId;

    fn config_with_admin() -> Arc<AuthConfig> {
        Arc::new(AuthConfig::development().with_initial_admin(InitialAdmin {
            email: "admin@oficina.com".into(),
            password: "admin".into(),
            name: "Administrador".into(),
        }))
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let store = Arc::new(MemoryAuthStore::new());
        let use_case = BootstrapUseCase::new(store.clone(), store.clone(), config_with_admin());

        let first = use_case.execute().await.unwrap();
        assert_eq!(first.roles_created, 4);
        assert!(first.admin_seeded);

        let second = use_case.execute().await.unwrap();
        assert_eq!(second, BootstrapReport::default());

        assert_eq!(store.count().await.unwrap(), 4);
        assert_eq!(store.members_with_role(RoleName::Admin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_without_admin_config() {
        let store = Arc::new(MemoryAuthStore::new());
        let use_case = BootstrapUseCase::new(
            store.clone(),
            store.clone(),
            Arc::new(AuthConfig::development()),
        );

        let report = use_case.execute().await.unwrap();
        assert!(!report.admin_seeded);
        assert_eq!(store.list_roles().await.unwrap().len(), 4);
        assert_eq!(store.members_with_role(RoleName::Admin).await.unwrap(), 0);
    }

    /// Hides identities from the first email lookup, the way a row written
    /// by a concurrently starting instance would be missed
    struct LateLookup {
        inner: MemoryAuthStore,
        lookups: std::sync::atomic::AtomicUsize,
    }

    impl IdentityRepository for LateLookup {
        async fn create(&self, identity: &NewIdentity) -> AuthResult<Identity> {
            self.inner.create(identity).await
        }

        async fn find_by_id(&self, id: IdentityId) -> AuthResult<Option<Identity>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
            use std::sync::atomic::Ordering;
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(None);
            }
            self.inner.find_by_email(email).await
        }

        async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
            self.inner.exists_by_email(email).await
        }

        async fn find_all(&self) -> AuthResult<Vec<Identity>> {
            self.inner.find_all().await
        }

        async fn find_all_by_role(&self, role: RoleName) -> AuthResult<Vec<Identity>> {
            self.inner.find_all_by_role(role).await
        }

        async fn grant_role(&self, id: IdentityId, role: RoleName) -> AuthResult<bool> {
            self.inner.grant_role(id, role).await
        }

        async fn delete_guarded(&self, id: IdentityId) -> AuthResult<DeleteOutcome> {
            self.inner.delete_guarded(id).await
        }
    }

    #[tokio::test]
    async fn test_bootstrap_tolerates_admin_inserted_concurrently() {
        let store = MemoryAuthStore::with_default_roles();
        // the other instance's row, not yet promoted
        let racing = store
            .create(&NewIdentity::new(
                Email::new("admin@oficina.com").unwrap(),
                Secret::new("admin").unwrap(),
                DisplayName::new("Administrador").unwrap(),
            ))
            .await
            .unwrap();

        let identities = Arc::new(LateLookup {
            inner: store.clone(),
            lookups: Default::default(),
        });
        let use_case = BootstrapUseCase::new(identities, Arc::new(store.clone()), config_with_admin());

        let report = use_case.execute().await.unwrap();
        assert!(!report.admin_seeded);

        let admin = store.find_by_id(racing.id).await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert_eq!(store.members_with_role(RoleName::Admin).await.unwrap(), 1);
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_promotes_existing_identity() {
        let store = Arc::new(MemoryAuthStore::new());
        store.seed(&RoleName::ALL).await.unwrap();
        let existing = store
            .create(
                &NewIdentity::new(
                    Email::new("admin@oficina.com").unwrap(),
                    Secret::new("old").unwrap(),
                    DisplayName::new("Old").unwrap(),
                )
                .with_role(RoleName::Customer),
            )
            .await
            .unwrap();

        let use_case = BootstrapUseCase::new(store.clone(), store.clone(), config_with_admin());
        assert!(use_case.execute().await.unwrap().admin_seeded);

        let promoted = store.find_by_id(existing.id).await.unwrap().unwrap();
        assert!(promoted.is_admin());
        assert!(promoted.has_role(RoleName::Customer));
    }
}
