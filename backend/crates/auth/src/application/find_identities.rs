//! Identity Queries

use std::sync::Arc;

use kernel::id::IdentityId;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

pub struct FindIdentitiesUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
}

impl<I> FindIdentitiesUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>) -> Self {
        Self { identity_repo }
    }

    pub async fn by_id(&self, id: IdentityId) -> AuthResult<Identity> {
        self.identity_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Everyone sorted by name, or only holders of `role`
    pub async fn list(&self, role: Option<RoleName>) -> AuthResult<Vec<Identity>> {
        match role {
            Some(role) => self.identity_repo.find_all_by_role(role).await,
            None => self.identity_repo.find_all().await,
        }
    }
}
